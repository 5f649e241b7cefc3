//! Session state: the loaded file and the transcript built on top of it.

use chat_core::{build_system_prompt, LoadedFile, Message, Role, RESULT_FILE_NAME};
use chrono::{DateTime, Utc};
use llm_client::Credential;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Where a session is in its lifecycle. Derived from the transcript, never
/// stored, so it cannot drift from the messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    FileLoaded,
    Conversing,
}

/// Outcome of [`Session::set_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChange {
    /// First file of the session.
    Loaded,
    /// A different file replaced the previous one; the transcript was reset.
    Replaced,
    /// Same file as before; nothing changed.
    Unchanged,
}

/// The latest answer, ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name: &'static str,
    pub content: String,
}

#[derive(Debug)]
pub struct Session {
    id: String,
    file: Option<LoadedFile>,
    messages: Vec<Message>,
    credential: Credential,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            file: None,
            messages: Vec::new(),
            credential: Credential::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn file(&self) -> Option<&LoadedFile> {
        self.file.as_ref()
    }

    /// Load a data file.
    ///
    /// A file with a new identity replaces the current one and resets the
    /// transcript to a single system message carrying its text; the previous
    /// conversation is discarded. Uploading the current file again is a no-op.
    pub fn set_file(&mut self, name: &str, raw: Vec<u8>) -> Result<FileChange> {
        let incoming = LoadedFile::decode(name, raw)?;

        let change = match &self.file {
            Some(current) if current.identity() == incoming.identity() => {
                tracing::debug!(session = %self.id, file = %name, "Same file uploaded again, ignoring");
                return Ok(FileChange::Unchanged);
            }
            Some(_) => FileChange::Replaced,
            None => FileChange::Loaded,
        };

        let prompt = build_system_prompt(incoming.name(), incoming.text());
        self.messages = vec![Message::system(prompt)];
        self.file = Some(incoming);
        self.touch();

        tracing::info!(session = %self.id, file = %name, ?change, "Data file loaded");
        Ok(change)
    }

    /// Read-only view of the transcript, oldest first.
    pub fn transcript(&self) -> &[Message] {
        &self.messages
    }

    pub fn append_user(&mut self, text: impl Into<String>) -> Result<()> {
        if !self.has_context() {
            return Err(SessionError::InvalidState(
                "no data file has been loaded".to_string(),
            ));
        }
        self.messages.push(Message::user(text));
        self.touch();
        Ok(())
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
        self.touch();
    }

    pub fn phase(&self) -> SessionPhase {
        if !self.has_context() {
            SessionPhase::Empty
        } else if self.messages.iter().any(|m| !m.is_system()) {
            SessionPhase::Conversing
        } else {
            SessionPhase::FileLoaded
        }
    }

    /// Content of the most recent assistant message.
    pub fn latest_answer(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    pub fn export_latest(&self) -> Option<Export> {
        self.latest_answer().map(|content| Export {
            file_name: RESULT_FILE_NAME,
            content: content.to_string(),
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = credential;
    }

    pub fn clear_credential(&mut self) {
        self.credential = Credential::default();
    }

    fn has_context(&self) -> bool {
        self.messages.first().is_some_and(Message::is_system)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOTES: &[u8] = b"age,intent\n18-24,Remain\n";

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new("s1");
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.transcript().is_empty());
        assert!(session.file().is_none());
        assert!(session.latest_answer().is_none());
    }

    #[test]
    fn test_first_upload_seeds_system_message() {
        let mut session = Session::new("s1");

        let change = session.set_file("votes.csv", VOTES.to_vec()).unwrap();

        assert_eq!(change, FileChange::Loaded);
        assert_eq!(session.phase(), SessionPhase::FileLoaded);
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, Role::System);
        assert!(transcript[0].content.contains("votes.csv"));
        assert!(transcript[0].content.contains("age,intent"));
        assert!(transcript[0].content.contains("18-24,Remain"));
    }

    #[test]
    fn test_identical_upload_is_noop() {
        let mut session = Session::new("s1");
        session.set_file("votes.csv", VOTES.to_vec()).unwrap();
        session.append_user("q").unwrap();
        session.append_assistant("a");
        let before = session.transcript().to_vec();

        let change = session.set_file("votes.csv", VOTES.to_vec()).unwrap();

        assert_eq!(change, FileChange::Unchanged);
        assert_eq!(session.transcript(), before.as_slice());
        assert_eq!(session.phase(), SessionPhase::Conversing);
    }

    #[test]
    fn test_different_file_resets_transcript() {
        let mut session = Session::new("s1");
        session.set_file("votes.csv", VOTES.to_vec()).unwrap();
        session.append_user("q").unwrap();
        session.append_assistant("a");

        let change = session
            .set_file("sales.csv", b"region,total\nnorth,10\n".to_vec())
            .unwrap();

        assert_eq!(change, FileChange::Replaced);
        assert_eq!(session.phase(), SessionPhase::FileLoaded);
        assert_eq!(session.transcript().len(), 1);
        assert!(session.transcript()[0].content.contains("north,10"));
        assert!(!session.transcript()[0].content.contains("18-24"));
        assert_eq!(session.file().unwrap().name(), "sales.csv");
        assert!(session.latest_answer().is_none());
    }

    #[test]
    fn test_same_name_new_content_resets() {
        let mut session = Session::new("s1");
        session.set_file("votes.csv", b"age,intent\n".to_vec()).unwrap();

        let change = session.set_file("votes.csv", VOTES.to_vec()).unwrap();

        assert_eq!(change, FileChange::Replaced);
        assert!(session.transcript()[0].content.contains("18-24,Remain"));
    }

    #[test]
    fn test_invalid_utf8_leaves_state_untouched() {
        let mut session = Session::new("s1");
        session.set_file("votes.csv", VOTES.to_vec()).unwrap();
        let before = session.transcript().to_vec();

        let result = session.set_file("binary.xls", vec![0xd0, 0xcf, 0x11, 0xe0, 0xff]);

        assert!(matches!(result, Err(SessionError::Decode(_))));
        assert_eq!(session.transcript(), before.as_slice());
        assert_eq!(session.file().unwrap().name(), "votes.csv");
    }

    #[test]
    fn test_append_user_without_file_is_invalid_state() {
        let mut session = Session::new("s1");
        let result = session.append_user("hello?");
        assert!(matches!(result, Err(SessionError::InvalidState(_))));
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_export_matches_latest_assistant_message() {
        let mut session = Session::new("s1");
        session.set_file("votes.csv", VOTES.to_vec()).unwrap();
        session.append_user("first").unwrap();
        session.append_assistant("one");
        session.append_user("second").unwrap();
        session.append_assistant("two");

        let export = session.export_latest().unwrap();

        assert_eq!(export.file_name, "result.txt");
        assert_eq!(export.content, "two");
    }

    #[test]
    fn test_credential_is_redacted_in_debug() {
        let mut session = Session::new("s1");
        session.set_credential(Credential::new("sk-live-abc"));
        assert!(!format!("{session:?}").contains("sk-live-abc"));

        session.clear_credential();
        assert!(session.credential().is_empty());
    }
}
