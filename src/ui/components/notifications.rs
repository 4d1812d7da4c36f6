use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::util::{
    colors,
    notify::{Level, Notification},
};

/// Latest notifications, newest last, one per line.
pub struct Notifications<'a> {
    items: &'a [Notification],
}

impl<'a> Notifications<'a> {
    pub fn new(items: &'a [Notification]) -> Self {
        Self { items }
    }
}

impl Widget for Notifications<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = usize::from(area.height);
        let skip = self.items.len().saturating_sub(visible);
        let lines: Vec<Line> = self
            .items
            .iter()
            .skip(skip)
            .map(|n| {
                let (icon, color) = match n.level {
                    Level::Success => ("✓", colors::SUCCESS),
                    Level::Info => ("i", colors::ACCENT),
                    Level::Error => ("✗", colors::DANGER),
                };
                Line::from(vec![
                    Span::styled(format!("{icon} "), Style::default().fg(color)),
                    Span::styled(n.message.clone(), Style::default().fg(color)),
                ])
            })
            .collect();

        Paragraph::new(lines).render(area, buf);
    }
}
