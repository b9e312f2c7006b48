// Core app lifecycle, focus, overlays, and clipboard dispatch

use crate::action::Action;
use crate::components::Component;
use crate::error::Result;
use crate::input::focus::FocusArea;
use crate::util::truncate;

use super::super::App;

/// Longest copied text echoed back in the toast
const COPY_PREVIEW_WIDTH: usize = 48;

impl App {
    pub(super) fn dispatch_core(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Tick => {
                let toasts_changed = self.ui.notifications.tick();
                let spinner_moved = self.ui.feed_view.tick(self.controller.feed());
                // Toasts animate their countdown bar while visible
                let animating = self.ui.notifications.has_notifications() || self.controller.is_loading_history();
                if toasts_changed || spinner_moved || animating {
                    self.mark_dirty();
                }
            }
            Action::FocusNext => self.ui.focus.next(),
            Action::FocusPrev => self.ui.focus.prev(),
            Action::FocusArea(area) => self.ui.focus.focus(area),
            Action::GuideOpen => self.ui.command_guide.show(),
            Action::GuideClose => self.ui.command_guide.hide(),
            Action::GuideUseExample(ref example) => {
                tracing::debug!("Guide example picked: {}", example);
                self.ui.command_guide.hide();
                self.ui.chat_input.update(&action);
                self.ui.focus.focus(FocusArea::Input);
            }
            Action::CopyToClipboard { label, text } => self.copy_to_clipboard(&label, &text),
            Action::NotificationDismiss => self.ui.notifications.dismiss_first(),
            _ => unreachable!("non-core action passed to dispatch_core: {:?}", action),
        }
        Ok(())
    }

    fn copy_to_clipboard(&mut self, label: &str, text: &str) {
        let Some(clipboard) = self.ui.clipboard.as_mut() else {
            self.ui.notifications.error("Clipboard is not available");
            return;
        };
        match clipboard.set_text(text.to_string()) {
            Ok(()) => {
                self.ui
                    .notifications
                    .success(format!("{label} copied: {}", truncate(text, COPY_PREVIEW_WIDTH)));
            }
            Err(e) => {
                tracing::warn!("Clipboard write failed: {}", e);
                self.ui.notifications.error(format!("Failed to copy {label}: {e}"));
            }
        }
    }
}
