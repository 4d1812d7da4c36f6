use crate::event::events::Event;
use crate::ui::context::AppContext;
use crate::ui::state::AppState;
use crate::ui::traits::{Action, View};
use ratatui::Frame;
use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::Rect;

/// Stack of views; the top one is shown and receives keys. Every view in
/// the stack receives events.
pub struct Router {
    pub stack: Vec<Box<dyn View>>,
}

impl Router {
    pub fn new(initial_view: Box<dyn View>) -> Self {
        Self {
            stack: vec![initial_view],
        }
    }

    pub async fn push(&mut self, mut view: Box<dyn View>, ctx: &AppContext) {
        view.on_mount(ctx).await;
        self.stack.push(view);
    }

    /// Returns `false` when already at the root view.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Replaces the whole stack with a new root view.
    pub async fn reset(&mut self, mut view: Box<dyn View>, ctx: &AppContext) {
        view.on_mount(ctx).await;
        self.stack.clear();
        self.stack.push(view);
    }

    pub fn active_view(&self) -> Option<&dyn View> {
        self.stack.last().map(|v| v.as_ref())
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, ctx: &AppContext) {
        if let Some(view) = self.stack.last_mut() {
            view.render(f, area, state, ctx);
        }
    }

    pub async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        match self.stack.last_mut() {
            Some(view) => view.handle_input(key, state, ctx).await,
            None => None,
        }
    }

    pub async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        for view in &mut self.stack {
            view.on_event(event, ctx).await;
        }
    }
}
