//! Uploaded data files.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What makes two uploads "the same file": the file name plus a SHA-256 of
/// the raw bytes. Re-uploading an identical file is then a no-op, while a
/// file edited in place under the same name still counts as new.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileIdentity {
    pub name: String,
    pub sha256: String,
}

impl FileIdentity {
    pub fn of(name: &str, raw: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            sha256: hex::encode(Sha256::digest(raw)),
        }
    }
}

/// A file decoded to text. The text is passed through verbatim; columns are
/// never parsed here.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    identity: FileIdentity,
    text: String,
}

impl LoadedFile {
    /// Decode `raw` as UTF-8.
    pub fn decode(name: &str, raw: Vec<u8>) -> Result<Self, std::string::FromUtf8Error> {
        let identity = FileIdentity::of(name, &raw);
        let text = String::from_utf8(raw)?;
        log::debug!("Decoded '{}' ({} bytes)", identity.name, text.len());
        Ok(Self { identity, text })
    }

    pub fn identity(&self) -> &FileIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
