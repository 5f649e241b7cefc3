//! # Session Manager
//!
//! Per-session chat state over one uploaded data file:
//! - [`Session`] holds the loaded file and the transcript
//! - [`TranscriptController`] runs one question/answer turn against a
//!   completion provider
//! - [`SessionRegistry`] keeps the live sessions of a server process apart

pub mod controller;
pub mod error;
pub mod registry;
pub mod session;

// Re-exports
pub use controller::TranscriptController;
pub use error::{Result, SessionError};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{Export, FileChange, Session, SessionPhase};
