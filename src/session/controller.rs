//! Session controller: owns the active conversation and drives every
//! request/response cycle against the command service.
//!
//! The controller never awaits. Each user operation (`init`, `submit`,
//! `switch_to`, ...) updates local state and hands back a [`Request`]; the
//! caller runs it with [`execute`] and feeds the [`Completion`] into
//! [`SessionController::handle_completion`], which may ask for a follow-up.

use crate::api::{ApiError, Backend, CommandRequest, ConversationId, ConversationSummary, MessageEntry, ResponseEnvelope};
use crate::render::{Dispatcher, Fragment, RowAction, RowActionKind};

use super::feed::Feed;
use super::store::ConversationStore;

pub const NEW_CHAT_TITLE: &str = "New chat";

const BUSY_MESSAGE: &str = "Wait for the current command to finish.";
const HISTORY_BUSY_MESSAGE: &str = "Wait for the conversation to finish loading.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPurpose {
    /// Startup: resume the last active conversation if there is one
    Init,
    /// After the service assigned a new conversation id
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ListConversations(ListPurpose),
    LoadHistory(ConversationId),
    Submit(CommandRequest),
    Delete(ConversationId),
}

#[derive(Debug, Clone)]
pub enum Completion {
    Conversations {
        purpose: ListPurpose,
        result: Result<Vec<ConversationSummary>, ApiError>,
    },
    History {
        id: ConversationId,
        result: Result<Vec<MessageEntry>, ApiError>,
    },
    Submitted {
        command: String,
        result: Result<ResponseEnvelope, ApiError>,
    },
    Deleted {
        id: ConversationId,
        result: Result<(), ApiError>,
    },
}

/// Run one request against the backend.
pub async fn execute(backend: &dyn Backend, request: Request) -> Completion {
    match request {
        Request::ListConversations(purpose) => Completion::Conversations {
            purpose,
            result: backend.list_conversations().await,
        },
        Request::LoadHistory(id) => {
            let result = backend.conversation_messages(&id).await;
            Completion::History { id, result }
        }
        Request::Submit(request) => {
            let result = backend.submit_command(&request).await;
            Completion::Submitted {
                command: request.command,
                result,
            }
        }
        Request::Delete(id) => {
            let result = backend.delete_conversation(&id).await;
            Completion::Deleted { id, result }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient message for the toast area; never written to the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// What activating a row action asks of the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Ignored,
    Request(Request),
    Copy { label: String, text: String },
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub welcome_message: String,
    pub resume_last: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            welcome_message: "Welcome to ChatOps! Type a command to manage your Docker containers, \
                              or press F1 for the command guide."
                .to_string(),
            resume_last: true,
        }
    }
}

pub struct SessionController {
    dispatcher: Dispatcher,
    options: SessionOptions,
    store: ConversationStore,
    feed: Feed,
    active: Option<ConversationId>,
    title: String,
    /// A submit is in flight
    loading: bool,
    /// History load in flight; responses for any other id are stale
    pending_history: Option<ConversationId>,
    /// Awaiting confirmation from the user
    pending_delete: Option<ConversationId>,
    notices: Vec<Notice>,
}

impl SessionController {
    pub fn new(dispatcher: Dispatcher, options: SessionOptions) -> Self {
        Self {
            dispatcher,
            options,
            store: ConversationStore::new(),
            feed: Feed::new(),
            active: None,
            title: NEW_CHAT_TITLE.to_string(),
            loading: false,
            pending_history: None,
            pending_delete: None,
            notices: Vec::new(),
        }
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn active_id(&self) -> Option<&ConversationId> {
        self.active.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_history(&self) -> bool {
        self.pending_history.is_some()
    }

    pub fn pending_delete(&self) -> Option<&ConversationId> {
        self.pending_delete.as_ref()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Refuse conversation changes while a submit is in flight, so its
    /// response cannot land in another conversation's feed.
    fn refuse_if_busy(&mut self) -> bool {
        if self.loading {
            self.notify(NoticeLevel::Info, BUSY_MESSAGE);
        }
        self.loading
    }

    /// Commands wait for any in-flight submit and for the active history replay.
    pub fn can_submit(&self) -> bool {
        !self.loading && self.pending_history.is_none()
    }

    fn enter_new(&mut self) {
        self.active = None;
        self.pending_history = None;
        self.title = NEW_CHAT_TITLE.to_string();
        self.feed.clear();
        if !self.options.welcome_message.trim().is_empty() {
            self.feed.push(Fragment::system(self.options.welcome_message.clone()));
        }
    }

    /// Show a fresh chat and ask for the conversation list.
    pub fn init(&mut self) -> Request {
        self.enter_new();
        Request::ListConversations(ListPurpose::Init)
    }

    pub fn start_new_chat(&mut self) {
        if self.refuse_if_busy() {
            return;
        }
        tracing::debug!("Starting new chat");
        self.enter_new();
    }

    /// Make `id` the active conversation and load its history. Switching to
    /// the already active conversation does nothing.
    pub fn switch_to(&mut self, id: ConversationId) -> Option<Request> {
        if self.active.as_ref() == Some(&id) {
            return None;
        }
        if self.refuse_if_busy() {
            return None;
        }
        tracing::debug!("Switching to conversation {}", id);
        self.title = self.store.title(&id);
        self.active = Some(id.clone());
        self.pending_history = Some(id.clone());
        self.feed.clear();
        Some(Request::LoadHistory(id))
    }

    /// Ask for confirmation before deleting `id`. Returns whether the caller
    /// should show the confirmation prompt.
    pub fn request_delete(&mut self, id: ConversationId) -> bool {
        if self.refuse_if_busy() {
            return false;
        }
        self.pending_delete = Some(id);
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Option<Request> {
        let id = self.pending_delete.take()?;
        if self.refuse_if_busy() {
            return None;
        }
        tracing::info!("Deleting conversation {}", id);
        Some(Request::Delete(id))
    }

    /// Append the user's command and a typing indicator, then send it.
    /// Blank input is ignored, as is a submit while another is in flight or
    /// the active conversation's history is still loading.
    pub fn submit(&mut self, command: &str) -> Option<Request> {
        let command = command.trim();
        if command.is_empty() || !self.can_submit() {
            return None;
        }

        self.feed.push(Fragment::user(command));
        self.feed.push(Fragment::typing());
        self.loading = true;

        Some(Request::Submit(CommandRequest {
            command: command.to_string(),
            conversation_id: self.active.clone(),
        }))
    }

    pub fn activate_row_action(&mut self, action: &RowAction) -> ActionOutcome {
        if !action.enabled {
            return ActionOutcome::Ignored;
        }
        match &action.kind {
            RowActionKind::Submit(command) => {
                if !self.can_submit() {
                    let message = if self.loading { BUSY_MESSAGE } else { HISTORY_BUSY_MESSAGE };
                    self.notify(NoticeLevel::Info, message);
                    return ActionOutcome::Ignored;
                }
                self.notify(NoticeLevel::Info, format!("Running: {command}"));
                self.submit(command)
                    .map(ActionOutcome::Request)
                    .unwrap_or(ActionOutcome::Ignored)
            }
            RowActionKind::Copy { label, text } => ActionOutcome::Copy {
                label: label.clone(),
                text: text.clone(),
            },
        }
    }

    /// Apply the result of a request. May return a follow-up request.
    pub fn handle_completion(&mut self, completion: Completion) -> Option<Request> {
        match completion {
            Completion::Conversations { purpose, result } => self.on_conversations(purpose, result),
            Completion::History { id, result } => {
                self.on_history(id, result);
                None
            }
            Completion::Submitted { command, result } => self.on_submitted(command, result),
            Completion::Deleted { id, result } => {
                self.on_deleted(id, result);
                None
            }
        }
    }

    fn on_conversations(
        &mut self,
        purpose: ListPurpose,
        result: Result<Vec<ConversationSummary>, ApiError>,
    ) -> Option<Request> {
        let conversations = match result {
            Ok(conversations) => conversations,
            Err(e) => {
                tracing::warn!("Failed to list conversations: {}", e);
                match purpose {
                    ListPurpose::Init => {
                        self.enter_new();
                        self.feed.push(Fragment::error(format!("Could not load conversations. {e}")));
                    }
                    ListPurpose::Refresh => {
                        self.notify(NoticeLevel::Error, format!("Could not refresh conversations: {e}"));
                    }
                }
                return None;
            }
        };

        tracing::debug!("Loaded {} conversations", conversations.len());
        self.store.replace(conversations);
        if let Some(active) = &self.active {
            self.title = self.store.title(active);
        }

        // Resume only from the untouched startup state. A late startup list
        // must not pull the user out of a chat they already began, and on
        // refresh the flagged conversation is the one already active.
        let untouched = self.active.is_none() && self.can_submit();
        match (purpose, self.store.last_active_id().cloned()) {
            (ListPurpose::Init, Some(id)) if self.options.resume_last && untouched => self.switch_to(id),
            _ => None,
        }
    }

    fn on_history(&mut self, id: ConversationId, result: Result<Vec<MessageEntry>, ApiError>) {
        if self.pending_history.as_ref() != Some(&id) || self.active.as_ref() != Some(&id) {
            tracing::debug!("Discarding stale history for {}", id);
            return;
        }
        self.pending_history = None;

        match result {
            Ok(entries) => {
                for entry in entries {
                    let response = entry.bot_response.with_received_command(entry.user_command.clone());
                    self.feed.push(Fragment::user(entry.user_command));
                    self.feed.push(self.dispatcher.dispatch(&response));
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load conversation {}: {}", id, e);
                self.feed.push(Fragment::error(format!("Could not load this conversation. {e}")));
            }
        }
    }

    fn on_submitted(&mut self, command: String, result: Result<ResponseEnvelope, ApiError>) -> Option<Request> {
        self.feed.remove_typing();
        self.loading = false;

        let envelope = match result {
            Ok(envelope) => envelope.with_received_command(command),
            Err(e) => {
                tracing::warn!("Command {:?} failed: {}", command, e);
                self.feed.push(Fragment::error(e.to_string()));
                return None;
            }
        };

        self.feed.push(self.dispatcher.dispatch(&envelope));

        match envelope.conversation_id {
            Some(id) if self.active.as_ref() != Some(&id) => {
                tracing::debug!("Service assigned conversation {}", id);
                self.active = Some(id);
                Some(Request::ListConversations(ListPurpose::Refresh))
            }
            _ => None,
        }
    }

    fn on_deleted(&mut self, id: ConversationId, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.store.remove(&id);
                if self.active.as_ref() == Some(&id) {
                    self.enter_new();
                }
                self.notify(NoticeLevel::Success, "Conversation deleted.");
            }
            Err(e) => {
                tracing::warn!("Failed to delete conversation {}: {}", id, e);
                self.notify(NoticeLevel::Error, format!("Could not delete conversation: {e}"));
            }
        }
    }

    /// Run `request` and every follow-up it triggers to completion.
    #[allow(dead_code)]
    pub async fn drive(&mut self, backend: &dyn Backend, request: Request) {
        let mut next = Some(request);
        while let Some(request) = next {
            let completion = execute(backend, request).await;
            next = self.handle_completion(completion);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Body, Role, TableBody, TemplateKey};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        conversations: Mutex<Vec<ConversationSummary>>,
        histories: Mutex<HashMap<String, Vec<MessageEntry>>>,
        responses: Mutex<VecDeque<Result<ResponseEnvelope, ApiError>>>,
        list_error: Option<ApiError>,
        delete_error: Option<ApiError>,
        calls: Mutex<Vec<String>>,
        submitted: Mutex<Vec<CommandRequest>>,
    }

    impl FakeBackend {
        fn with_conversations(conversations: Vec<ConversationSummary>) -> Self {
            Self {
                conversations: Mutex::new(conversations),
                ..Default::default()
            }
        }

        fn history(self, id: &str, entries: Vec<MessageEntry>) -> Self {
            self.histories.lock().unwrap().insert(id.to_string(), entries);
            self
        }

        fn respond(&self, result: Result<ResponseEnvelope, ApiError>) {
            self.responses.lock().unwrap().push_back(result);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn submit_command(&self, request: &CommandRequest) -> Result<ResponseEnvelope, ApiError> {
            self.calls.lock().unwrap().push(format!("submit {}", request.command));
            self.submitted.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(envelope(json!({"output_type": "text", "output": "ok"}))))
        }

        async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError> {
            self.calls.lock().unwrap().push("list".to_string());
            match &self.list_error {
                Some(e) => Err(e.clone()),
                None => Ok(self.conversations.lock().unwrap().clone()),
            }
        }

        async fn conversation_messages(&self, id: &ConversationId) -> Result<Vec<MessageEntry>, ApiError> {
            self.calls.lock().unwrap().push(format!("history {id}"));
            self.histories
                .lock()
                .unwrap()
                .get(id.as_str())
                .cloned()
                .ok_or(ApiError::Server { status: 404 })
        }

        async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(format!("delete {id}"));
            match &self.delete_error {
                Some(e) => Err(e.clone()),
                None => {
                    self.conversations.lock().unwrap().retain(|c| &c.id != id);
                    Ok(())
                }
            }
        }
    }

    fn envelope(value: serde_json::Value) -> ResponseEnvelope {
        serde_json::from_value(value).unwrap()
    }

    fn summary(id: &str, title: &str, last_active: bool) -> ConversationSummary {
        ConversationSummary {
            id: ConversationId::new(id),
            title: title.to_string(),
            is_last_active: last_active,
            created_at: Some(1_717_000_000.0),
        }
    }

    fn entry(command: &str, output: &str) -> MessageEntry {
        MessageEntry {
            user_command: command.to_string(),
            bot_response: envelope(json!({"output_type": "text", "output": output})),
        }
    }

    fn controller() -> SessionController {
        SessionController::new(Dispatcher::default(), SessionOptions::default())
    }

    fn roles(controller: &SessionController) -> Vec<Role> {
        controller.feed().fragments().iter().map(|f| f.role).collect()
    }

    #[tokio::test]
    async fn test_init_resumes_last_active_and_replays_in_order() {
        let backend = FakeBackend::with_conversations(vec![
            summary("a", "older", false),
            summary("b", "list containers", true),
        ])
        .history("b", vec![entry("docker ps", "first"), entry("docker images", "second")]);

        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;

        assert_eq!(session.active_id(), Some(&ConversationId::new("b")));
        assert_eq!(session.title(), "list containers");
        assert_eq!(roles(&session), vec![Role::User, Role::Bot, Role::User, Role::Bot]);
        assert_eq!(texts(&session), vec!["docker ps", "first", "docker images", "second"]);
        assert_eq!(backend.calls(), vec!["list", "history b"]);
    }

    #[tokio::test]
    async fn test_replay_attaches_command_for_empty_tables() {
        let backend = FakeBackend::with_conversations(vec![summary("a", "images", true)]).history(
            "a",
            vec![MessageEntry {
                user_command: "docker image ls".to_string(),
                bot_response: envelope(json!({"output_type": "table", "output": []})),
            }],
        );

        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;

        let view = session.feed().fragments()[1].table_view().unwrap();
        assert_eq!(view.body, TableBody::Empty("No images.".to_string()));
    }

    #[tokio::test]
    async fn test_init_without_last_active_stays_new() {
        let backend = FakeBackend::with_conversations(vec![summary("a", "x", false)]);
        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;

        assert_eq!(session.active_id(), None);
        assert_eq!(session.title(), NEW_CHAT_TITLE);
        assert_eq!(roles(&session), vec![Role::System]);
        assert_eq!(session.store().len(), 1);
        assert_eq!(backend.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_init_without_resume_stays_new() {
        let backend = FakeBackend::with_conversations(vec![summary("a", "x", true)]);
        let mut session = SessionController::new(
            Dispatcher::default(),
            SessionOptions {
                resume_last: false,
                ..Default::default()
            },
        );
        let request = session.init();
        session.drive(&backend, request).await;
        assert_eq!(session.active_id(), None);
        assert_eq!(backend.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_init_list_failure_shows_error_bubble() {
        let backend = FakeBackend {
            list_error: Some(ApiError::Network {
                message: "connection refused".to_string(),
            }),
            ..Default::default()
        };
        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;

        assert_eq!(session.active_id(), None);
        assert_eq!(roles(&session), vec![Role::System, Role::Error]);
    }

    #[tokio::test]
    async fn test_switch_to_active_is_noop() {
        let backend = FakeBackend::with_conversations(vec![summary("a", "x", true)])
            .history("a", vec![entry("docker ps", "out")]);
        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;

        let revision = session.feed().revision();
        assert_eq!(session.switch_to(ConversationId::new("a")), None);
        assert_eq!(session.feed().revision(), revision);
        assert_eq!(session.feed().len(), 2);
    }

    #[test]
    fn test_stale_history_is_discarded() {
        let mut session = controller();
        session.init();
        assert!(session.switch_to("a".into()).is_some());
        assert!(session.switch_to("b".into()).is_some());

        session.handle_completion(Completion::History {
            id: "a".into(),
            result: Ok(vec![entry("docker ps", "from a")]),
        });
        assert!(session.feed().is_empty());
        assert!(session.is_loading_history());

        session.handle_completion(Completion::History {
            id: "b".into(),
            result: Ok(vec![entry("docker images", "from b")]),
        });
        assert_eq!(session.feed().fragments()[1].text(), Some("from b"));
        assert!(!session.is_loading_history());
    }

    fn texts(controller: &SessionController) -> Vec<&str> {
        controller.feed().fragments().iter().filter_map(|f| f.text()).collect()
    }

    #[test]
    fn test_submit_waits_for_history_replay() {
        let mut session = controller();
        session.init();
        assert!(session.switch_to("a".into()).is_some());

        assert!(!session.can_submit());
        assert_eq!(session.submit("docker ps"), None);
        let inspect = RowAction::submit("Inspect", "inspect volume data");
        assert_eq!(session.activate_row_action(&inspect), ActionOutcome::Ignored);
        assert_eq!(session.take_notices()[0].message, HISTORY_BUSY_MESSAGE);
        assert!(session.feed().is_empty());

        session.handle_completion(Completion::History {
            id: "a".into(),
            result: Ok(vec![entry("docker images", "r1"), entry("docker volume ls", "r2")]),
        });
        assert!(session.can_submit());

        let request = session.submit("docker ps").unwrap();
        assert_eq!(
            request,
            Request::Submit(CommandRequest {
                command: "docker ps".to_string(),
                conversation_id: Some("a".into()),
            })
        );
        session.handle_completion(Completion::Submitted {
            command: "docker ps".to_string(),
            result: Ok(envelope(json!({"output_type": "text", "output": "NEW", "conversation_id": "a"}))),
        });
        assert_eq!(
            texts(&session),
            vec!["docker images", "r1", "docker volume ls", "r2", "docker ps", "NEW"]
        );
    }

    #[test]
    fn test_late_init_list_keeps_started_conversation() {
        let mut session = controller();
        let request = session.init();
        assert_eq!(request, Request::ListConversations(ListPurpose::Init));

        session.submit("docker ps").unwrap();
        let follow_up = session.handle_completion(Completion::Submitted {
            command: "docker ps".to_string(),
            result: Ok(envelope(json!({"output_type": "text", "output": "ok", "conversation_id": "new"}))),
        });
        assert_eq!(follow_up, Some(Request::ListConversations(ListPurpose::Refresh)));

        let follow_up = session.handle_completion(Completion::Conversations {
            purpose: ListPurpose::Init,
            result: Ok(vec![summary("old", "older chat", true), summary("new", "docker ps", false)]),
        });
        assert_eq!(follow_up, None);
        assert_eq!(session.active_id(), Some(&ConversationId::new("new")));
        assert_eq!(session.title(), "docker ps");
        assert!(!session.is_loading_history());
        assert_eq!(roles(&session), vec![Role::System, Role::User, Role::Bot]);
        assert_eq!(session.store().len(), 2);
    }

    #[test]
    fn test_init_list_during_submit_does_not_resume() {
        let mut session = controller();
        session.init();
        session.submit("docker ps").unwrap();

        let follow_up = session.handle_completion(Completion::Conversations {
            purpose: ListPurpose::Init,
            result: Ok(vec![summary("old", "older chat", true)]),
        });
        assert_eq!(follow_up, None);
        assert_eq!(session.active_id(), None);
        assert!(session.is_loading());
        assert!(session.feed().has_typing());

        session.handle_completion(Completion::Submitted {
            command: "docker ps".to_string(),
            result: Ok(envelope(json!({"output_type": "text", "output": "ok"}))),
        });
        assert_eq!(roles(&session), vec![Role::System, Role::User, Role::Bot]);
        assert_eq!(texts(&session)[1..], ["docker ps", "ok"]);
    }

    #[test]
    fn test_refresh_during_history_load_keeps_waiting() {
        let mut session = controller();
        session.init();
        session.switch_to("a".into()).unwrap();

        let follow_up = session.handle_completion(Completion::Conversations {
            purpose: ListPurpose::Refresh,
            result: Ok(vec![summary("a", "renamed", false), summary("b", "y", true)]),
        });
        assert_eq!(follow_up, None);
        assert_eq!(session.active_id(), Some(&ConversationId::new("a")));
        assert_eq!(session.title(), "renamed");
        assert!(session.is_loading_history());

        session.handle_completion(Completion::History {
            id: "a".into(),
            result: Ok(vec![entry("docker ps", "out")]),
        });
        assert_eq!(texts(&session), vec!["docker ps", "out"]);
    }

    #[test]
    fn test_history_after_deleting_its_conversation_is_dropped() {
        let mut session = controller();
        session.init();
        session.handle_completion(Completion::Conversations {
            purpose: ListPurpose::Refresh,
            result: Ok(vec![summary("a", "x", false)]),
        });
        session.switch_to("a".into()).unwrap();

        assert!(session.request_delete("a".into()));
        let request = session.confirm_delete().unwrap();
        assert_eq!(request, Request::Delete("a".into()));
        session.handle_completion(Completion::Deleted {
            id: "a".into(),
            result: Ok(()),
        });
        assert_eq!(session.active_id(), None);
        assert!(!session.is_loading_history());

        session.handle_completion(Completion::History {
            id: "a".into(),
            result: Ok(vec![entry("docker ps", "out")]),
        });
        assert_eq!(roles(&session), vec![Role::System]);
        assert!(session.store().is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_shows_error_bubble() {
        let backend = FakeBackend::with_conversations(vec![summary("gone", "x", true)]);
        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;

        assert_eq!(roles(&session), vec![Role::Error]);
        assert_eq!(session.active_id(), Some(&ConversationId::new("gone")));
    }

    #[tokio::test]
    async fn test_submit_in_new_chat_adopts_assigned_id() {
        let backend = FakeBackend::default();
        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;

        backend.respond(Ok(envelope(json!({
            "output_type": "table",
            "output": [{"status": "Up 2 hours", "name": "web", "is_self": false}],
            "conversation_id": "c-9"
        }))));
        *backend.conversations.lock().unwrap() = vec![summary("c-9", "docker ps", true)];

        let request = session.submit("  docker ps ").unwrap();
        assert!(session.is_loading());
        assert!(session.feed().has_typing());
        session.drive(&backend, request).await;

        assert_eq!(backend.submitted.lock().unwrap()[0].conversation_id, None);
        assert_eq!(backend.submitted.lock().unwrap()[0].command, "docker ps");
        assert_eq!(session.active_id(), Some(&ConversationId::new("c-9")));
        assert_eq!(session.title(), "docker ps");
        assert!(!session.is_loading());
        assert!(!session.feed().has_typing());
        // No history reload: the follow-up switch is a no-op
        assert_eq!(backend.calls(), vec!["list", "submit docker ps", "list"]);
        assert_eq!(roles(&session), vec![Role::System, Role::User, Role::Bot]);
        assert_eq!(session.feed().last().unwrap().template, TemplateKey::Table);
    }

    #[tokio::test]
    async fn test_submit_sends_active_id() {
        let backend = FakeBackend::with_conversations(vec![summary("a", "x", true)]).history("a", vec![]);
        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;

        backend.respond(Ok(envelope(json!({"output_type": "text", "output": "ok", "conversation_id": "a"}))));
        let request = session.submit("docker ps").unwrap();
        session.drive(&backend, request).await;

        assert_eq!(
            backend.submitted.lock().unwrap()[0].conversation_id,
            Some(ConversationId::new("a"))
        );
        assert_eq!(backend.calls(), vec!["list", "history a", "submit docker ps"]);
    }

    #[tokio::test]
    async fn test_submit_failure_clears_loading() {
        let backend = FakeBackend::default();
        backend.respond(Err(ApiError::Network {
            message: "connection refused".to_string(),
        }));
        let mut session = controller();
        session.init();

        let request = session.submit("docker ps").unwrap();
        session.drive(&backend, request).await;

        assert!(!session.is_loading());
        assert!(!session.feed().has_typing());
        let last = session.feed().last().unwrap();
        assert!(last.is_error());
        assert_eq!(last.text(), Some("Network error: connection refused."));
    }

    #[test]
    fn test_server_error_envelope_renders_error() {
        let mut session = controller();
        session.init();
        session.submit("docker ps").unwrap();
        session.handle_completion(Completion::Submitted {
            command: "docker ps".to_string(),
            result: Ok(ResponseEnvelope::error("Server Error: 500")),
        });
        assert_eq!(session.feed().last().unwrap().text(), Some("Server Error: 500"));
        assert!(!session.is_loading());
    }

    #[test]
    fn test_second_submit_is_refused() {
        let mut session = controller();
        session.init();
        assert!(session.submit("docker ps").is_some());
        assert!(session.submit("docker images").is_none());
        assert!(session.submit("   ").is_none());
        assert_eq!(session.feed().fragments().iter().filter(|f| f.is_typing()).count(), 1);
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut session = controller();
        session.init();
        assert!(session.submit(" \t ").is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_conversation_changes_refused_while_submitting() {
        let mut session = controller();
        session.init();
        session.submit("docker ps").unwrap();

        assert_eq!(session.switch_to("a".into()), None);
        session.start_new_chat();
        assert!(!session.request_delete("a".into()));
        assert!(session.feed().has_typing());

        let notices = session.take_notices();
        assert_eq!(notices.len(), 3);
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Info));
    }

    #[tokio::test]
    async fn test_delete_active_returns_to_new() {
        let backend = FakeBackend::with_conversations(vec![summary("a", "x", true), summary("b", "y", false)])
            .history("a", vec![entry("docker ps", "out")]);
        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;

        assert!(session.request_delete("a".into()));
        let request = session.confirm_delete().unwrap();
        session.drive(&backend, request).await;

        assert_eq!(session.active_id(), None);
        assert_eq!(session.title(), NEW_CHAT_TITLE);
        assert_eq!(roles(&session), vec![Role::System]);
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.take_notices()[0].level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_delete_other_leaves_feed_alone() {
        let backend = FakeBackend::with_conversations(vec![summary("a", "x", true), summary("b", "y", false)])
            .history("a", vec![entry("docker ps", "out")]);
        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;
        let revision = session.feed().revision();

        session.request_delete("b".into());
        let request = session.confirm_delete().unwrap();
        session.drive(&backend, request).await;

        assert_eq!(session.active_id(), Some(&ConversationId::new("a")));
        assert_eq!(session.feed().revision(), revision);
        assert!(!session.store().contains(&"b".into()));
    }

    #[tokio::test]
    async fn test_delete_failure_is_a_toast() {
        let backend = FakeBackend {
            conversations: Mutex::new(vec![summary("a", "x", false)]),
            delete_error: Some(ApiError::Server { status: 500 }),
            ..Default::default()
        };
        let mut session = controller();
        let request = session.init();
        session.drive(&backend, request).await;
        session.take_notices();

        session.request_delete("a".into());
        let request = session.confirm_delete().unwrap();
        session.drive(&backend, request).await;

        assert_eq!(session.store().len(), 1);
        assert_eq!(roles(&session), vec![Role::System]);
        let notices = session.take_notices();
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Could not delete conversation: Server Error: 500");
    }

    #[test]
    fn test_cancelled_delete_sends_nothing() {
        let mut session = controller();
        session.request_delete("a".into());
        session.cancel_delete();
        assert_eq!(session.confirm_delete(), None);
    }

    #[test]
    fn test_row_actions() {
        let mut session = controller();
        session.init();

        let disabled = RowAction::submit("Stop", "stop web").enabled_if(false);
        assert_eq!(session.activate_row_action(&disabled), ActionOutcome::Ignored);
        assert!(session.take_notices().is_empty());

        let copy = RowAction::copy("Copy", "Name", "web");
        assert_eq!(
            session.activate_row_action(&copy),
            ActionOutcome::Copy {
                label: "Name".to_string(),
                text: "web".to_string()
            }
        );

        let stop = RowAction::submit("Stop", "stop web");
        let outcome = session.activate_row_action(&stop);
        assert_eq!(
            outcome,
            ActionOutcome::Request(Request::Submit(CommandRequest {
                command: "stop web".to_string(),
                conversation_id: None,
            }))
        );
        assert_eq!(session.take_notices()[0].message, "Running: stop web");
        assert!(session.is_loading());
    }

    #[test]
    fn test_new_chat_shows_welcome() {
        let mut session = controller();
        session.init();
        session.start_new_chat();
        assert!(matches!(
            &session.feed().fragments()[0].body,
            Body::Text(text) if text.starts_with("Welcome")
        ));
    }
}
