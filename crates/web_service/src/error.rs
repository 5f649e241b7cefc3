use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use llm_client::LLMError;
use serde::Serialize;
use session_manager::SessionError;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("No answer to download yet")]
    NoResult,

    #[error("Missing query parameter '{0}'")]
    MissingParameter(&'static str),
}

#[derive(Serialize)]
struct JsonError {
    message: String,
    r#type: String,
}

#[derive(Serialize)]
struct JsonErrorWrapper {
    error: JsonError,
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::Session(SessionError::NotFound(_)) => "not_found_error",
            AppError::Session(SessionError::Decode(_)) => "decode_error",
            AppError::Session(SessionError::InvalidState(_)) => "invalid_state_error",
            AppError::Session(SessionError::EmptyQuery) | AppError::MissingParameter(_) => {
                "invalid_request_error"
            }
            AppError::Session(SessionError::Completion(_)) => "completion_error",
            AppError::NoResult => "not_found_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Session(SessionError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Session(SessionError::Decode(_)) => StatusCode::BAD_REQUEST,
            AppError::Session(SessionError::EmptyQuery) => StatusCode::BAD_REQUEST,
            AppError::Session(SessionError::InvalidState(_)) => StatusCode::CONFLICT,
            AppError::Session(SessionError::Completion(e)) => match e {
                LLMError::MissingCredential | LLMError::Auth(_) => StatusCode::UNAUTHORIZED,
                LLMError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::NoResult => StatusCode::NOT_FOUND,
            AppError::MissingParameter(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_response = JsonErrorWrapper {
            error: JsonError {
                message: self.to_string(),
                r#type: self.error_type().to_string(),
            },
        };
        HttpResponse::build(status_code).json(error_response)
    }
}
