//! Session manager error types

use llm_client::LLMError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("File is not valid UTF-8 text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Completion failed: {0}")]
    Completion(#[from] LLMError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
