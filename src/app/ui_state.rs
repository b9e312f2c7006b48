// UiState - focus, widgets, overlays, and layout areas for hit testing

use std::time::Duration;

use arboard::Clipboard;
use ratatui::layout::Rect;

use crate::components::{ChatInput, CommandGuide, ConfirmDialog, FeedView, NotificationManager, Sidebar};
use crate::config::GuideEntry;
use crate::input::focus::FocusManager;

pub struct UiState {
    pub focus: FocusManager,
    pub needs_redraw: bool,

    pub chat_input: ChatInput,
    pub feed_view: FeedView,
    pub sidebar: Sidebar,

    // Overlays
    pub confirm_dialog: ConfirmDialog,
    pub command_guide: CommandGuide,
    pub notifications: NotificationManager,
    pub clipboard: Option<Clipboard>,

    // Layout / hit testing areas
    pub sidebar_area: Rect,
    pub feed_area: Rect,
    pub input_area: Rect,
}

impl UiState {
    pub fn new(guide: Vec<GuideEntry>, toast_duration: Duration) -> Self {
        let clipboard = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                tracing::warn!("Clipboard unavailable: {}", e);
                None
            }
        };
        Self {
            focus: FocusManager::new(),
            needs_redraw: true,
            chat_input: ChatInput::new(),
            feed_view: FeedView::new(),
            sidebar: Sidebar::new(),
            confirm_dialog: ConfirmDialog::new(),
            command_guide: CommandGuide::new(guide),
            notifications: NotificationManager::new(toast_duration),
            clipboard,
            sidebar_area: Rect::default(),
            feed_area: Rect::default(),
            input_area: Rect::default(),
        }
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    pub fn has_overlay(&self) -> bool {
        self.confirm_dialog.is_visible() || self.command_guide.is_visible()
    }
}
