use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    entity::Resource,
    ui::{
        app::App,
        components::{notifications::Notifications, sidebar::Sidebar},
    },
    util::colors,
};

const NOTIFICATION_ROWS: u16 = 2;

pub struct AppLayout<'a> {
    pub app: &'a mut App,
}

impl<'a> AppLayout<'a> {
    pub fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub fn render(self, f: &mut Frame, area: Rect) {
        let buf = f.buffer_mut();
        buf.set_style(area, Style::new().bg(colors::BACKGROUND));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(NOTIFICATION_ROWS + 2)])
            .split(area);

        let main_area = chunks[0];
        let status_area = chunks[1];

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(22), Constraint::Min(1)])
            .split(main_area);

        let sidebar_area = main_chunks[0];
        let content_area = main_chunks[1];
        let sidebar_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .title("tunedesk")
            .title_alignment(Alignment::Center);

        let content_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .title(format!(" {} ", self.app.state.ui.current_route.title()));

        let sidebar_inner = sidebar_block.inner(sidebar_area);
        let content_inner = content_block.inner(content_area);

        f.render_widget(sidebar_block, sidebar_area);
        f.render_widget(content_block, content_area);
        f.render_widget(
            Sidebar::new(&Resource::BROWSABLE, self.app.state.ui.sidebar_index),
            sidebar_inner,
        );

        self.app
            .router
            .render(f, content_inner, &self.app.state, &self.app.ctx);

        let status_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(colors::NEUTRAL));
        let status_inner = status_block.inner(status_area);
        f.render_widget(status_block, status_area);

        let notifications = self.app.ctx.notifier.active();
        if notifications.is_empty() {
            let hints = self
                .app
                .router
                .active_view()
                .map(|v| v.hints())
                .unwrap_or_default();
            let lines = vec![
                Line::from(Span::styled(hints, Style::default().fg(colors::MUTED))),
                Line::from(Span::styled(
                    "tab/1-6 switch resource · esc back · q quit",
                    Style::default().fg(colors::NEUTRAL),
                )),
            ];
            f.render_widget(Paragraph::new(lines), status_inner);
        } else {
            f.render_widget(Notifications::new(&notifications), status_inner);
        }
    }
}
