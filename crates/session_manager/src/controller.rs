//! One question/answer turn.

use std::sync::Arc;

use llm_client::{CompletionProvider, CompletionRequest, Credential, LLMError};

use crate::error::{Result, SessionError};
use crate::session::Session;

pub struct TranscriptController {
    provider: Arc<dyn CompletionProvider>,
    model: String,
}

impl TranscriptController {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask `query` against the session's transcript and return the answer.
    ///
    /// Empty input is rejected before the transcript is touched. Once the
    /// query is appended it stays there even if the completion call fails,
    /// so a retry resends it as part of the history.
    pub async fn submit(
        &self,
        session: &mut Session,
        query: &str,
        credential: &Credential,
    ) -> Result<String> {
        if query.trim().is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        if credential.is_empty() {
            return Err(LLMError::MissingCredential.into());
        }

        session.append_user(query)?;

        let request = CompletionRequest::deterministic(&self.model, session.transcript());
        tracing::debug!(
            session = %session.id(),
            model = %self.model,
            messages = request.messages.len(),
            "Submitting transcript"
        );

        let reply = match self.provider.complete(request, credential).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(session = %session.id(), error = %e, "Completion failed");
                return Err(e.into());
            }
        };

        session.append_assistant(reply.content.clone());
        tracing::info!(
            session = %session.id(),
            transcript_len = session.transcript().len(),
            "Answer received"
        );
        Ok(reply.content)
    }
}
