// Feed scrolling and row action dispatch

use crate::action::Action;
use crate::error::Result;
use crate::session::ActionOutcome;

use super::super::App;

impl App {
    pub(super) fn dispatch_feed(&mut self, action: Action) -> Result<()> {
        match action {
            Action::ScrollUp(_)
            | Action::ScrollDown(_)
            | Action::ScrollPageUp
            | Action::ScrollPageDown
            | Action::ScrollToTop
            | Action::ScrollToBottom
            | Action::RowActionNext
            | Action::RowActionPrev => self.ui.feed_view.update(&action),
            Action::RowActionActivate(row_action) => {
                match self.controller.activate_row_action(&row_action) {
                    ActionOutcome::Ignored => {}
                    ActionOutcome::Request(request) => self.spawn_request(request),
                    ActionOutcome::Copy { label, text } => {
                        self.dispatch_core(Action::CopyToClipboard { label, text })?;
                    }
                }
                self.sync_session();
            }
            _ => unreachable!("non-feed action passed to dispatch_feed: {:?}", action),
        }
        Ok(())
    }
}
