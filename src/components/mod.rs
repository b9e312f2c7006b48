pub mod chat_input;
pub mod command_guide;
pub mod confirm_dialog;
pub mod feed_layout;
pub mod feed_view;
pub mod notification;
pub mod sidebar;
pub mod spinner;

use crossterm::event::Event;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;
use crate::config::Theme;

pub use chat_input::ChatInput;
pub use command_guide::CommandGuide;
pub use confirm_dialog::ConfirmDialog;
pub use feed_view::FeedView;
pub use notification::NotificationManager;
pub use sidebar::Sidebar;

pub trait Component {
    fn handle_event(&mut self, event: &Event) -> Option<Action>;

    fn update(&mut self, action: &Action);

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme);
}
