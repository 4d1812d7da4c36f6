use async_trait::async_trait;
use ratatui::crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::{
    entity::Resource,
    event::events::Event,
    ui::{context::AppContext, state::AppState},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The key was consumed; no global handling.
    None,
    Back,
    OpenRecord { resource: Resource, id: String },
    CreateRecord(Resource),
}

#[async_trait]
pub trait View: Send {
    async fn on_mount(&mut self, _ctx: &AppContext) {}

    fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, ctx: &AppContext);

    /// `None` leaves the key to the global bindings.
    async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action>;

    async fn on_event(&mut self, _event: &Event, _ctx: &AppContext) {}

    /// Short key reference for the status bar.
    fn hints(&self) -> &'static str {
        ""
    }
}
