use async_trait::async_trait;
use chat_core::Message;
use thiserror::Error;

use crate::credential::Credential;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("No API key provided")]
    MissingCredential,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Empty response from completion service")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// One chat completion call: the whole transcript so far plus sampling
/// settings.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
}

impl<'a> CompletionRequest<'a> {
    /// Deterministic sampling (temperature 0).
    pub fn deterministic(model: &'a str, messages: &'a [Message]) -> Self {
        Self {
            model,
            messages,
            temperature: 0.0,
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Turn a transcript into the next assistant message.
    ///
    /// Blocks until the service replies or fails. No retries.
    async fn complete(
        &self,
        request: CompletionRequest<'_>,
        credential: &Credential,
    ) -> Result<Message>;
}
