// Domain-specific action dispatch handlers

mod core;
mod feed;
mod input;
mod session;

use crate::action::Action;
use crate::error::Result;
use super::App;

impl App {
    /// Main dispatch router - delegates to domain-specific handlers
    /// This is the single exhaustive match over Action for compile-time safety
    pub(super) fn dispatch(&mut self, action: Action) -> Result<()> {
        use Action::*;

        match action {
            // 1. Core app lifecycle, focus, overlays, and toasts
            Quit | Tick
            | FocusNext | FocusPrev | FocusArea(_)
            | GuideOpen | GuideClose | GuideUseExample(_)
            | CopyToClipboard { .. } | NotificationDismiss
                => self.dispatch_core(action),

            // 2. Feed scrolling and row actions
            ScrollUp(_) | ScrollDown(_)
            | ScrollPageUp | ScrollPageDown
            | ScrollToTop | ScrollToBottom
            | RowActionNext | RowActionPrev | RowActionActivate(_)
                => self.dispatch_feed(action),

            // 3. Commands, conversations, and request completions
            InputSubmit(_)
            | ConversationNew | ConversationSwitch(_) | ConversationDeleteRequest(_)
            | ConfirmAccept | ConfirmCancel
            | RequestCompleted(_)
                => self.dispatch_session(action),

            // Catch-all for Action::None
            None => Ok(()),
        }
    }
}
