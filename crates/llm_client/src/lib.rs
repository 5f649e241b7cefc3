pub mod credential;
pub mod provider;
pub mod providers;

pub use credential::Credential;
pub use provider::{CompletionProvider, CompletionRequest, LLMError, Result};
pub use providers::OpenAIProvider;
