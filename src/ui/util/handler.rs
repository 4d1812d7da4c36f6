use crossterm::event::KeyCode;
use ratatui::crossterm::event::{KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::{
    entity::Resource,
    event::events::Event,
    ui::{
        app::App,
        input::InputHandler,
        message::AppMessage,
        state::Route,
        traits::Action,
        tui::{TerminalEvent, Tui},
        views::ResourceDetail,
    },
};

pub struct EventHandler;

impl EventHandler {
    pub async fn handle_events(app: &mut App, tui: &mut Tui) -> color_eyre::Result<bool> {
        let mut should_render = false;
        if let Some(evt) = tui.next().await {
            if Self::handle_event(app, evt, tui).await? {
                should_render = true;
            }
        }

        while let Ok(evt) = app.event_rx.try_recv() {
            Self::handle_action(app, evt).await;
            should_render = true;
        }

        Ok(should_render)
    }

    pub async fn handle_event(
        app: &mut App,
        evt: TerminalEvent,
        tui: &mut Tui,
    ) -> color_eyre::Result<bool> {
        match evt {
            TerminalEvent::Init => {
                let _ = app.event_tx.send(Event::Initialize);
            }
            TerminalEvent::Quit => app.should_quit = true,
            TerminalEvent::FocusGained => {
                app.has_focus = true;
                tui.clear()?;
            }
            TerminalEvent::FocusLost => app.has_focus = false,
            TerminalEvent::Key(key) => Self::handle_key_event(app, key).await,
            TerminalEvent::Tick => {
                return Ok(app.has_focus);
            }
            _ => {}
        }

        Ok(true)
    }

    pub async fn handle_action(app: &mut App, evt: Event) {
        app.router.on_event(&evt, &app.ctx).await;

        match evt {
            Event::Initialize => app.open_list(app.state.ui.sidebar_index).await,
            Event::OpenList(resource) => {
                let index = Resource::BROWSABLE
                    .iter()
                    .position(|r| *r == resource)
                    .unwrap_or_default();
                app.open_list(index).await;
            }
            Event::OpenRecord { resource, id } => {
                app.state.ui.current_route = Route::Detail(resource, id.clone());
                app.router
                    .push(Box::new(ResourceDetail::edit(resource, id)), &app.ctx)
                    .await;
            }
            Event::CreateRecord(resource) => {
                app.state.ui.current_route = Route::Create(resource);
                app.router
                    .push(Box::new(ResourceDetail::create(resource)), &app.ctx)
                    .await;
            }
            Event::Back => app.update(AppMessage::GoBack).await,
            Event::ListFetched { ticket, result: Err(err) } => {
                warn!(resource = %ticket.resource, error = %err, "list fetch failed");
            }
            Event::RecordFetched { resource, id, result: Err(err) } => {
                warn!(%resource, %id, error = %err, "record fetch failed");
                app.ctx.notifier.error(err.to_string());
            }
            Event::ReferencesLoaded(resource) => {
                debug!(%resource, "reference lists ready");
            }
            _ => {}
        }
    }

    async fn handle_key_event(app: &mut App, evt: KeyEvent) {
        if evt.kind != KeyEventKind::Press {
            return;
        }

        if let KeyCode::Char('c') = evt.code {
            if evt.modifiers == KeyModifiers::CONTROL {
                app.update(AppMessage::Quit).await;
                return;
            }
        }

        let action = app.router.handle_input(evt, &app.state, &app.ctx).await;
        if let Some(action) = action {
            Self::dispatch_action(app, action).await;
            return;
        }

        if let Some(msg) = InputHandler::handle_key(evt) {
            app.update(msg).await;
        }
    }

    async fn dispatch_action(app: &mut App, action: Action) {
        match action {
            Action::None => {}
            Action::Back => app.update(AppMessage::GoBack).await,
            Action::OpenRecord { resource, id } => {
                let _ = app.event_tx.send(Event::OpenRecord { resource, id });
            }
            Action::CreateRecord(resource) => {
                let _ = app.event_tx.send(Event::CreateRecord(resource));
            }
        }
    }
}
