use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use crate::util::colors;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Pending,
    Submit(String),
    Cancel,
}

/// Single-line text input.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    label: String,
    input: String,
    /// Cursor position in chars.
    cursor: usize,
}

impl Prompt {
    pub fn new(label: impl Into<String>, initial: impl Into<String>) -> Self {
        let input: String = initial.into();
        Self {
            label: label.into(),
            cursor: input.chars().count(),
            input,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptOutcome {
        match key.code {
            KeyCode::Enter => return PromptOutcome::Submit(self.input.clone()),
            KeyCode::Esc => return PromptOutcome::Cancel,
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                self.cursor = 0;
            }
            KeyCode::Char(c) => {
                let at = self.byte_index();
                self.input.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index();
                self.input.remove(at);
            }
            KeyCode::Delete if self.cursor < self.input.chars().count() => {
                let at = self.byte_index();
                self.input.remove(at);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.input.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.chars().count(),
            _ => {}
        }
        PromptOutcome::Pending
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let label = format!("{}: ", self.label);
        let line = Line::from(vec![
            Span::styled(
                label.clone(),
                Style::default().fg(colors::PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::raw(self.input.clone()),
        ]);
        f.render_widget(Paragraph::new(line), area);

        let before: String = self.input.chars().take(self.cursor).collect();
        let offset = u16::try_from(label.width() + before.width()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(offset).min(area.right().saturating_sub(1));
        f.set_cursor_position(Position::new(x, area.y));
    }
}
