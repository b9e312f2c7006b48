// Conversation lifecycle dispatch: submit, switch, new, delete, completions

use crate::action::Action;
use crate::error::Result;
use crate::input::focus::FocusArea;

use super::super::App;

impl App {
    pub(super) fn dispatch_session(&mut self, action: Action) -> Result<()> {
        match action {
            Action::InputSubmit(command) => {
                if let Some(request) = self.controller.submit(&command) {
                    self.spawn_request(request);
                }
            }
            Action::ConversationNew => {
                self.controller.start_new_chat();
                self.ui.focus.focus(FocusArea::Input);
            }
            Action::ConversationSwitch(id) => {
                if let Some(request) = self.controller.switch_to(id) {
                    self.spawn_request(request);
                }
            }
            Action::ConversationDeleteRequest(id) => {
                let title = self.controller.store().title(&id);
                if self.controller.request_delete(id) {
                    self.ui
                        .confirm_dialog
                        .show("Delete conversation", format!("Delete \"{title}\"? This cannot be undone."));
                }
            }
            Action::ConfirmAccept => {
                self.ui.confirm_dialog.dismiss();
                if let Some(request) = self.controller.confirm_delete() {
                    self.spawn_request(request);
                }
            }
            Action::ConfirmCancel => {
                self.ui.confirm_dialog.dismiss();
                self.controller.cancel_delete();
            }
            Action::RequestCompleted(completion) => {
                if let Some(request) = self.controller.handle_completion(completion) {
                    self.spawn_request(request);
                }
            }
            _ => unreachable!("non-session action passed to dispatch_session: {:?}", action),
        }
        self.sync_session();
        Ok(())
    }
}
