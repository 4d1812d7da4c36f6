use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{List, ListItem, Widget},
};

use crate::{entity::Resource, util::colors};

/// Resource navigation. Entries are numbered for the digit shortcuts.
pub struct Sidebar<'a> {
    items: &'a [Resource],
    selected_index: usize,
}

impl<'a> Sidebar<'a> {
    pub fn new(items: &'a [Resource], selected_index: usize) -> Self {
        Self {
            items,
            selected_index,
        }
    }
}

impl<'a> Widget for Sidebar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, resource)| {
                let style = if i == self.selected_index {
                    Style::default()
                        .fg(colors::PRIMARY)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors::MUTED)
                };
                ListItem::new(format!(" {} {}", i + 1, resource.label())).style(style)
            })
            .collect();

        List::new(items).render(area, buf);
    }
}
