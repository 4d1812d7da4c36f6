use std::sync::Arc;

use flume::{Receiver, Sender};
use ratatui::Frame;
use tracing::info;

use crate::{
    config::AdminConfig,
    entity::Resource,
    event::events::Event,
    http::ApiService,
    util::task::TaskManager,
};

use super::{
    context::AppContext,
    layout::AppLayout,
    message::AppMessage,
    router::Router,
    state::{AppState, Route},
    tui::{self, TerminalEvent},
    util::handler::EventHandler,
    views::ResourceList,
};

pub struct App {
    pub event_rx: Receiver<Event>,
    pub event_tx: Sender<Event>,
    pub ctx: AppContext,
    pub state: AppState,
    pub router: Router,
    pub task_manager: TaskManager,
    pub has_focus: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: AdminConfig) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = flume::unbounded();
        let api = Arc::new(ApiService::new(&config)?);
        info!(api = %config.api_url, "starting admin console");

        let ctx = AppContext::new(api, event_tx.clone(), config);
        let first = Resource::BROWSABLE[0];

        Ok(Self {
            event_rx,
            event_tx,
            ctx,
            state: AppState::default(),
            router: Router::new(Box::new(ResourceList::new(first))),
            task_manager: TaskManager::new(),
            has_focus: true,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = tui::Tui::new()?;
        tui.enter()?;

        EventHandler::handle_event(self, TerminalEvent::Init, &mut tui).await?;
        while !self.should_quit {
            tui.draw(|f| {
                self.ui(f);
            })?;

            EventHandler::handle_events(self, &mut tui).await?;
        }

        self.task_manager.abort_all();
        tui.exit()?;
        Ok(())
    }

    fn ui(&mut self, frame: &mut Frame) {
        if self.has_focus {
            let area = frame.area();
            AppLayout::new(self).render(frame, area);
        }
    }

    pub async fn update(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Quit => self.should_quit = true,
            AppMessage::GoBack => {
                if self.router.pop() {
                    self.state.ui.current_route = Route::List(self.state.ui.current_route.resource());
                }
            }
            AppMessage::NextSidebarItem => {
                let next = (self.state.ui.sidebar_index + 1) % Resource::BROWSABLE.len();
                self.open_list(next).await;
            }
            AppMessage::PreviousSidebarItem => {
                let len = Resource::BROWSABLE.len();
                let previous = (self.state.ui.sidebar_index + len - 1) % len;
                self.open_list(previous).await;
            }
            AppMessage::SetSidebarIndex(index) if index < Resource::BROWSABLE.len() => {
                self.open_list(index).await;
            }
            AppMessage::SetSidebarIndex(_) => {}
        }
    }

    pub fn selected_resource(&self) -> Resource {
        Resource::BROWSABLE[self.state.ui.sidebar_index]
    }

    pub async fn open_list(&mut self, index: usize) {
        self.state.ui.sidebar_index = index;
        let resource = self.selected_resource();
        self.state.ui.current_route = Route::List(resource);
        self.router
            .reset(Box::new(ResourceList::new(resource)), &self.ctx)
            .await;
    }
}
