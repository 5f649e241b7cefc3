//! chat_core - Core types shared by the data-to-text crates
//!
//! - `message` - Role and Message, the unit of a transcript
//! - `file` - LoadedFile and its identity
//! - `prompt` - the system prompt that seeds a transcript with file data
//! - `config` - Config loaded from `config.toml` and the environment

pub mod config;
pub mod file;
pub mod message;
pub mod prompt;

pub use config::Config;
pub use file::{FileIdentity, LoadedFile};
pub use message::{Message, Role};
pub use prompt::{build_system_prompt, INSTRUCTIONS};

/// Name of the plain-text artifact the latest answer is exported as.
pub const RESULT_FILE_NAME: &str = "result.txt";

/// Model used when neither config nor flags name one.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// OpenAI-compatible endpoint used when no base URL is configured.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
