//! In-memory list of conversation summaries.

use crate::api::{ConversationId, ConversationSummary};

pub const UNTITLED_CONVERSATION: &str = "Untitled conversation";

/// Conversations in the order the service listed them. The list is replaced
/// wholesale on every refresh and never edited in place, except for removals.
#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    conversations: Vec<ConversationSummary>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, conversations: Vec<ConversationSummary>) {
        self.conversations = conversations;
    }

    /// Returns whether the conversation was present.
    pub fn remove(&mut self, id: &ConversationId) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| &c.id != id);
        self.conversations.len() != before
    }

    pub fn get(&self, id: &ConversationId) -> Option<&ConversationSummary> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.get(id).is_some()
    }

    /// Display title, falling back for unknown or blank-titled conversations.
    pub fn title(&self, id: &ConversationId) -> String {
        self.get(id)
            .map(|c| c.title.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED_CONVERSATION)
            .to_string()
    }

    /// The conversation the service flags as last active, if any.
    pub fn last_active_id(&self) -> Option<&ConversationId> {
        self.conversations
            .iter()
            .find(|c| c.is_last_active)
            .map(|c| &c.id)
    }

    pub fn list(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
