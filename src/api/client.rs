//! HTTP client for the command service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::{ApiError, Backend, CommandRequest, ConversationId, ConversationSummary, MessageEntry, ResponseEnvelope};

const USER_AGENT: &str = concat!("dockchat/", env!("CARGO_PKG_VERSION"));

/// How much of an undecodable body is quoted in the error
const DECODE_SNIPPET_CHARS: usize = 200;

/// Talks JSON to the command service over HTTP.
///
/// There is no request timeout and no retry: a failed call surfaces once and
/// the user decides what to do next.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
            message: format!("{base_url}: {e}"),
        })?;
        // Url::join replaces the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ApiError::from)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::InvalidUrl {
            message: format!("{path}: {e}"),
        })
    }

    fn conversation_endpoint(&self, id: &ConversationId) -> Result<Url, ApiError> {
        self.endpoint(&format!("api/conversation/{}", urlencoding::encode(id.as_str())))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            let snippet: String = body.chars().take(DECODE_SNIPPET_CHARS).collect();
            ApiError::Decode {
                message: format!("{e} - Response: {snippet}"),
            }
        })
    }
}

/// Builds the error for a non-2xx answer, preferring the service's own message.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(message) }) if !message.trim().is_empty() => ApiError::Rejected {
            status: status.as_u16(),
            message,
        },
        _ => ApiError::Server {
            status: status.as_u16(),
        },
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn submit_command(&self, request: &CommandRequest) -> Result<ResponseEnvelope, ApiError> {
        let url = self.endpoint("api/command")?;
        tracing::debug!(
            "POST {} command={:?} conversation={:?}",
            url,
            request.command,
            request.conversation_id
        );

        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<ResponseEnvelope>(&body) {
            Ok(mut envelope) => {
                if !status.is_success() && envelope.error_message().is_none() {
                    envelope.error = Some(ApiError::Server { status: status.as_u16() }.to_string());
                }
                Ok(envelope)
            }
            Err(_) if !status.is_success() => Ok(ResponseEnvelope::error(
                ApiError::Server { status: status.as_u16() }.to_string(),
            )),
            Err(e) => Err(ApiError::Decode {
                message: e.to_string(),
            }),
        }
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError> {
        let url = self.endpoint("api/conversations")?;
        self.get_json(url).await
    }

    async fn conversation_messages(&self, id: &ConversationId) -> Result<Vec<MessageEntry>, ApiError> {
        let url = self.conversation_endpoint(id)?;
        self.get_json(url).await
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ApiError> {
        let url = self.conversation_endpoint(id)?;
        let response = self.client.delete(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}
