use async_trait::async_trait;
use chat_core::{Config, Message, Role, DEFAULT_API_BASE, DEFAULT_MODEL};
use reqwest::{Client, Proxy, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::credential::Credential;
use crate::provider::{CompletionProvider, CompletionRequest, LLMError, Result};

pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAIProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build a provider from [`Config`], honouring its proxy settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if !config.http_proxy.is_empty() {
            builder = builder.proxy(Proxy::http(&config.http_proxy)?);
        }
        if !config.https_proxy.is_empty() {
            builder = builder.proxy(Proxy::https(&config.https_proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.api_base.clone(),
            model: config.model.clone(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Default model, used when a request leaves its model empty.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a non-streaming chat completions body.
pub fn build_chat_body(model: &str, messages: &[Message], temperature: f32) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
        "stream": false,
    })
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the assistant message out of a chat completions response body.
pub fn parse_chat_response(body: &str) -> Result<Message> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| LLMError::Malformed(e.to_string()))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or(LLMError::EmptyResponse)?;

    Ok(Message {
        role: Role::Assistant,
        content,
    })
}

/// Map a non-success status to an error, using the API's own message when the
/// body carries one.
fn status_error(status: StatusCode, body: &str) -> LLMError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LLMError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimited(message),
        _ => LLMError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(
        &self,
        request: CompletionRequest<'_>,
        credential: &Credential,
    ) -> Result<Message> {
        if credential.is_empty() {
            return Err(LLMError::MissingCredential);
        }

        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model
        };
        log::debug!(
            "Requesting completion: model={}, messages={}",
            model,
            request.messages.len()
        );

        let body = build_chat_body(model, request.messages, request.temperature);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            log::warn!("Completion request failed with HTTP {}", status);
            return Err(status_error(status, &text));
        }

        parse_chat_response(&text)
    }
}
