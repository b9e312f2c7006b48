use crate::api::ConversationId;
use crate::input::focus::FocusArea;
use crate::render::RowAction;
use crate::session::Completion;

#[derive(Debug, Clone)]
pub enum Action {
    /// Event consumed, nothing to dispatch
    None,
    Quit,
    Tick,

    FocusNext,
    FocusPrev,
    FocusArea(FocusArea),

    // Chat input
    InputSubmit(String),

    // Feed
    ScrollUp(u16),
    ScrollDown(u16),
    ScrollPageUp,
    ScrollPageDown,
    ScrollToTop,
    ScrollToBottom,
    RowActionNext,
    RowActionPrev,
    RowActionActivate(RowAction),

    // Conversations
    ConversationNew,
    ConversationSwitch(ConversationId),
    ConversationDeleteRequest(ConversationId),
    ConfirmAccept,
    ConfirmCancel,

    // Command guide
    GuideOpen,
    GuideClose,
    GuideUseExample(String),

    CopyToClipboard { label: String, text: String },
    NotificationDismiss,

    /// A background request finished
    RequestCompleted(Completion),
}
