//! Conversation state: the store, the feed, and the controller that ties
//! them to the command service.

mod controller;
mod feed;
mod store;

pub use controller::{
    execute, ActionOutcome, Completion, ListPurpose, Notice, NoticeLevel, Request, SessionController,
    SessionOptions, NEW_CHAT_TITLE,
};
pub use feed::Feed;
pub use store::{ConversationStore, UNTITLED_CONVERSATION};
