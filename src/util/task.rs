use std::collections::HashMap;
use tokio::task::JoinHandle;

/// Background work keyed by purpose. Spawning under a key that is already
/// running aborts the older task.
#[derive(Default)]
pub struct TaskManager {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    pub fn spawn(&mut self, key: impl Into<String>, task: JoinHandle<()>) {
        self.tasks.retain(|_, handle| !handle.is_finished());
        if let Some(handle) = self.tasks.insert(key.into(), task) {
            handle.abort();
        }
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.tasks.get(key).is_some_and(|h| !h.is_finished())
    }

    pub fn abort(&mut self, key: &str) {
        if let Some(handle) = self.tasks.remove(key) {
            handle.abort();
        }
    }

    pub fn abort_all(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
        self.tasks.clear();
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn respawn_aborts_previous_task() {
        let mut tasks = TaskManager::new();
        let first = tokio::spawn(async { tokio::time::sleep(Duration::from_secs(60)).await });
        let first_abort = first.abort_handle();
        tasks.spawn("list:songs", first);
        tasks.spawn("list:songs", tokio::spawn(async {}));

        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(first_abort.is_finished());
    }

    #[tokio::test]
    async fn abort_removes_task() {
        let mut tasks = TaskManager::new();
        tasks.spawn(
            "delete",
            tokio::spawn(async { tokio::time::sleep(Duration::from_secs(60)).await }),
        );
        assert!(tasks.is_running("delete"));
        tasks.abort("delete");
        assert!(!tasks.is_running("delete"));
    }
}
