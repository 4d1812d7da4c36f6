use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::util::colors;

/// Modal yes/no question drawn over the content pane.
pub struct ConfirmDialog<'a> {
    title: &'a str,
    message: &'a str,
    busy: bool,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(title: &'a str, message: &'a str) -> Self {
        Self {
            title,
            message,
            busy: false,
        }
    }

    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }
}

pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

impl Widget for ConfirmDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered(area, area.width.min(50), 7);
        Clear.render(popup, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(colors::DANGER))
            .title(self.title)
            .title_alignment(Alignment::Center);

        let footer = if self.busy {
            Line::from(Span::styled("Deleting...", Style::default().fg(colors::MUTED)))
        } else {
            Line::from(vec![
                Span::styled("y", Style::default().fg(colors::PRIMARY).add_modifier(Modifier::BOLD)),
                Span::raw(" confirm   "),
                Span::styled("n", Style::default().fg(colors::PRIMARY).add_modifier(Modifier::BOLD)),
                Span::raw(" cancel"),
            ])
        };

        Paragraph::new(vec![Line::from(self.message), Line::default(), footer])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(popup, buf);
    }
}
