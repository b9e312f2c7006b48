// Input event handling: keyboard, mouse, paste
// Domain: Event routing to overlays first, then the focused widget

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::action::Action;
use crate::components::Component;
use crate::input::focus::FocusArea;

use super::super::App;

/// Lines per mouse wheel notch
const WHEEL_LINES: u16 = 3;

fn contains(area: Rect, column: u16, row: u16) -> bool {
    area.contains(Position::new(column, row))
}

impl App {
    pub(in crate::app) fn handle_event(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(text) => self.handle_paste(text),
            // Redraw is already pending; layout follows the new size
            Event::Resize(..) => Some(Action::None),
            _ => None,
        }
    }

    fn handle_paste(&mut self, text: String) -> Option<Action> {
        if self.ui.has_overlay() {
            return None;
        }
        self.ui.chat_input.paste_text(&text);
        Some(Action::FocusArea(FocusArea::Input))
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        #[cfg(debug_assertions)]
        tracing::debug!("Key event: {:?}, focus: {:?}", key, self.ui.focus.current());

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return Some(Action::Quit);
        }

        let event = Event::Key(key);

        // Modal overlays swallow everything
        if self.ui.confirm_dialog.is_visible() {
            return self.ui.confirm_dialog.handle_event(&event).or(Some(Action::None));
        }
        if self.ui.command_guide.is_visible() {
            return self.ui.command_guide.handle_event(&event);
        }

        match key.code {
            KeyCode::F(1) => return Some(Action::GuideOpen),
            KeyCode::Tab => return Some(Action::FocusNext),
            KeyCode::BackTab => return Some(Action::FocusPrev),
            KeyCode::Char('n') if ctrl => return Some(Action::ConversationNew),
            _ => {}
        }

        let action = match self.ui.focus.current() {
            FocusArea::Input => self.ui.chat_input.handle_event(&event),
            FocusArea::Feed => self.ui.feed_view.handle_event(&event),
            FocusArea::Sidebar => self.ui.sidebar.handle_event(&event),
        };
        if action.is_some() {
            return action;
        }

        // Unclaimed keys
        match key.code {
            KeyCode::PageUp => Some(Action::ScrollPageUp),
            KeyCode::PageDown => Some(Action::ScrollPageDown),
            KeyCode::Esc if self.ui.notifications.has_notifications() => Some(Action::NotificationDismiss),
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Action> {
        if self.ui.has_overlay() {
            return None;
        }
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::ScrollUp if contains(self.ui.feed_area, column, row) => {
                Some(Action::ScrollUp(WHEEL_LINES))
            }
            MouseEventKind::ScrollDown if contains(self.ui.feed_area, column, row) => {
                Some(Action::ScrollDown(WHEEL_LINES))
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let area = if contains(self.ui.sidebar_area, column, row) {
                    FocusArea::Sidebar
                } else if contains(self.ui.feed_area, column, row) {
                    FocusArea::Feed
                } else if contains(self.ui.input_area, column, row) {
                    FocusArea::Input
                } else {
                    return None;
                };
                Some(Action::FocusArea(area))
            }
            _ => None,
        }
    }
}
