use crate::ui::message::AppMessage;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Global keys, consulted only when the active view did not handle the key.
pub struct InputHandler;

impl InputHandler {
    pub fn handle_key(key: KeyEvent) -> Option<AppMessage> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppMessage::Quit),
            (KeyCode::Char('q'), _) => Some(AppMessage::Quit),
            (KeyCode::Esc, _) => Some(AppMessage::GoBack),
            (KeyCode::Tab, _) => Some(AppMessage::NextSidebarItem),
            (KeyCode::BackTab, _) => Some(AppMessage::PreviousSidebarItem),
            (KeyCode::Char(c @ '1'..='6'), _) => {
                Some(AppMessage::SetSidebarIndex(c as usize - '1' as usize))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn digits_select_sidebar_entries() {
        let key = KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE);
        assert_matches!(InputHandler::handle_key(key), Some(AppMessage::SetSidebarIndex(2)));

        let key = KeyEvent::new(KeyCode::Char('7'), KeyModifiers::NONE);
        assert_matches!(InputHandler::handle_key(key), None);
    }
}
