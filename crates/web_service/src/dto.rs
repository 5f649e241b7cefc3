//! Request and response bodies of the HTTP API
use chat_core::Message;
use serde::{Deserialize, Serialize};
use session_manager::{FileChange, SessionPhase};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionCreatedDTO {
    pub session_id: String,
}

#[derive(Deserialize, Debug)]
pub struct SetCredentialRequest {
    pub api_key: String,
}

#[derive(Deserialize, Debug)]
pub struct UploadParams {
    pub name: Option<String>,
}

/// Result of a file upload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileUploadDTO {
    pub file_name: String,
    pub change: FileChange,
    pub phase: SessionPhase,
    pub transcript_len: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryResponse {
    pub answer: String,
    pub transcript_len: usize,
}

#[derive(Deserialize, Debug, Default)]
pub struct TranscriptParams {
    #[serde(default)]
    pub include_system: bool,
}

/// Transcript view for rendering
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TranscriptDTO {
    pub phase: SessionPhase,
    pub file_name: Option<String>,
    pub messages: Vec<Message>,
}
