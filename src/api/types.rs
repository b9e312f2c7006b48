//! Wire types shared with the command service.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Opaque conversation identifier assigned by the command service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Entry of `GET /api/conversations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_last_active: bool,
    /// Creation time in epoch seconds, when the service reports it
    #[serde(default)]
    pub created_at: Option<f64>,
}

/// Entry of `GET /api/conversation/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEntry {
    pub user_command: String,
    pub bot_response: ResponseEnvelope,
}

/// Body of `POST /api/command`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRequest {
    pub command: String,
    pub conversation_id: Option<ConversationId>,
}

/// Response object returned by the command endpoint.
///
/// `output` stays untyped here; [`ResponseEnvelope::decode`](super::envelope)
/// turns it into a closed [`DecodedResponse`](super::DecodedResponse) before
/// anything renders it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub output_type: Option<String>,
    #[serde(default)]
    pub output: Value,
    #[serde(default, deserialize_with = "lenient_error")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
    /// Command text attached on the client; never sent back to the service
    #[serde(skip)]
    pub received_command: Option<String>,
}

impl ResponseEnvelope {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output_type: Some("text".to_string()),
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_received_command(mut self, command: impl Into<String>) -> Self {
        self.received_command = Some(command.into());
        self
    }

    /// The server-reported error, if any. Blank strings count as absent.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }

    pub fn received_command(&self) -> &str {
        self.received_command.as_deref().unwrap_or("")
    }
}

/// Accepts `null`, strings, and any other scalar for the `error` field.
fn lenient_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Renders a JSON scalar the way a table cell shows it.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

pub(crate) fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}
