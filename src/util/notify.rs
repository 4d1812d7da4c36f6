use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub created_at: Instant,
}

/// Transient, non-blocking user feedback. Cheap to clone; clones share the
/// same queue.
#[derive(Clone)]
pub struct Notifier {
    queue: Arc<Mutex<VecDeque<Notification>>>,
    ttl: Duration,
}

const MAX_VISIBLE: usize = 4;

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            ttl,
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Level::Success, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Level::Error, message.into());
    }

    fn push(&self, level: Level, message: String) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.push_back(Notification {
            level,
            message,
            created_at: Instant::now(),
        });
        while queue.len() > MAX_VISIBLE {
            queue.pop_front();
        }
    }

    /// Notifications still within their lifetime; expired ones are dropped.
    pub fn active(&self) -> Vec<Notification> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        queue.retain(|n| n.created_at.elapsed() < ttl);
        queue.iter().cloned().collect()
    }

    /// Every queued notification regardless of age.
    pub fn history(&self) -> Vec<Notification> {
        let queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_queue() {
        let notifier = Notifier::new(Duration::from_secs(60));
        let other = notifier.clone();
        other.error("boom");
        assert_eq!(notifier.active().len(), 1);
        assert_eq!(notifier.active()[0].level, Level::Error);
    }

    #[test]
    fn expired_notifications_disappear() {
        let notifier = Notifier::new(Duration::ZERO);
        notifier.info("gone");
        assert!(notifier.active().is_empty());
        assert!(notifier.history().is_empty());
    }

    #[test]
    fn queue_is_bounded() {
        let notifier = Notifier::new(Duration::from_secs(60));
        for i in 0..10 {
            notifier.success(format!("saved {i}"));
        }
        let active = notifier.active();
        assert_eq!(active.len(), MAX_VISIBLE);
        assert_eq!(active.last().unwrap().message, "saved 9");
    }
}
