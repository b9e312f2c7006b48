//! Command service contract
//!
//! Wire types, the boundary decoder that turns untyped envelopes into closed
//! response shapes, and the [`Backend`] seam the session talks through.

mod client;
mod envelope;
mod rows;
mod types;

pub use client::HttpBackend;
pub use envelope::{ActionReceipt, AssistantTable, DecodedResponse, ReceiptDetail, TablePayload};
pub use rows::{ContainerRow, ImageRow, LogRow, NetworkRow, Row, RowKind, StatsRow, VolumeRow};
pub use types::{CommandRequest, ConversationId, ConversationSummary, MessageEntry, ResponseEnvelope};

use async_trait::async_trait;

/// Error types for command service calls
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {message}.")]
    Network { message: String },

    #[error("Server Error: {status}")]
    Server { status: u16 },

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid server response: {message}")]
    Decode { message: String },

    #[error("Invalid request URL: {message}")]
    InvalidUrl { message: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode {
                message: e.to_string(),
            }
        } else {
            ApiError::Network {
                message: e.to_string(),
            }
        }
    }
}

/// The four calls the console makes against the command service.
///
/// `submit_command` reports HTTP failures inside the envelope (as its `error`
/// field) so they render like any other server error; only transport failures
/// and undecodable success bodies come back as `Err`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn submit_command(&self, request: &CommandRequest) -> Result<ResponseEnvelope, ApiError>;

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError>;

    async fn conversation_messages(&self, id: &ConversationId) -> Result<Vec<MessageEntry>, ApiError>;

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ApiError>;
}
