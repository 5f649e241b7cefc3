//! Live sessions of one server process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{Result, SessionError};
use crate::session::Session;

/// A session's state. Holding the lock serialises turns within the session.
pub type SessionHandle = Arc<Mutex<Session>>;

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// In-memory map of session id to session. Nothing is persisted; dropping a
/// session (or the registry) forgets its file, transcript and credential.
///
/// With an idle TTL, sessions nobody has looked up for that long are dropped
/// the next time a session is created.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Entry>>,
    idle_ttl: Option<Duration>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Option<Duration>) -> Self {
        Self {
            sessions: RwLock::default(),
            idle_ttl,
        }
    }

    /// Start a new session and return its id.
    pub async fn create(&self) -> String {
        self.sweep_idle().await;

        let id = Uuid::new_v4().to_string();
        let entry = Entry {
            handle: Arc::new(Mutex::new(Session::new(id.clone()))),
            last_seen: Instant::now(),
        };
        self.sessions.write().await.insert(id.clone(), entry);
        tracing::info!(session = %id, "Session created");
        id
    }

    /// Look up a session and mark it as recently used.
    pub async fn get(&self, id: &str) -> Result<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        entry.last_seen = Instant::now();
        Ok(entry.handle.clone())
    }

    /// End a session. Returns `false` if it did not exist.
    pub async fn terminate(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "Session terminated");
        }
        removed
    }

    /// Drop sessions idle for longer than the TTL and return how many went.
    /// A session whose handle is still held elsewhere (a query in flight) is
    /// kept regardless of age.
    pub async fn sweep_idle(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_seen.elapsed() < ttl || Arc::strong_count(&entry.handle) > 1;
            if !keep {
                tracing::info!(session = %id, "Session expired after {:?} idle", ttl);
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = SessionRegistry::new();
        let id = registry.create().await;

        let handle = registry.get(&id).await.unwrap();
        assert_eq!(handle.lock().await.id(), id);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let registry = SessionRegistry::new();
        let result = registry.get("nope").await;
        assert!(matches!(result, Err(SessionError::NotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_terminate_forgets_session() {
        let registry = SessionRegistry::new();
        let id = registry.create().await;

        assert!(registry.terminate(&id).await);
        assert!(!registry.terminate(&id).await);
        assert!(registry.get(&id).await.is_err());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        let a = registry.create().await;
        let b = registry.create().await;
        assert_ne!(a, b);

        let a_handle = registry.get(&a).await.unwrap();
        a_handle
            .lock()
            .await
            .set_file("a.csv", b"x\n1\n".to_vec())
            .unwrap();

        let b_handle = registry.get(&b).await.unwrap();
        assert!(b_handle.lock().await.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_without_ttl_sessions_stay() {
        let registry = SessionRegistry::new();
        registry.create().await;
        registry.create().await;

        assert_eq!(registry.sweep_idle().await, 0);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_swept_on_create() {
        let registry = SessionRegistry::with_idle_ttl(Some(Duration::ZERO));
        let stale = registry.create().await;

        let fresh = registry.create().await;

        assert!(matches!(registry.get(&stale).await, Err(SessionError::NotFound(_))));
        assert!(registry.get(&fresh).await.is_ok());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_held_session_survives_sweep() {
        let registry = SessionRegistry::with_idle_ttl(Some(Duration::ZERO));
        let id = registry.create().await;
        let handle = registry.get(&id).await.unwrap();

        assert_eq!(registry.sweep_idle().await, 0);
        drop(handle);
        assert_eq!(registry.sweep_idle().await, 1);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_lookup_refreshes_idle_clock() {
        let registry = SessionRegistry::with_idle_ttl(Some(Duration::from_millis(300)));
        let id = registry.create().await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        registry.get(&id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(registry.sweep_idle().await, 0);
        assert_eq!(registry.len().await, 1);
    }
}
