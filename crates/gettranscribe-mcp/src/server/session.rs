//! Legacy SSE session management.
//!
//! One long-lived session per accepted `/sse` connection, keyed by a
//! generated identifier and holding the credential resolved when the stream
//! was opened. Sessions are removed when the connection closes; there is no
//! replay or resume, a disconnected client simply reconnects fresh.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, RwLock};

use crate::auth::Credential;

use super::rpc::JsonRpcResponse;

/// Sessions idle longer than this are swept.
const SESSION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Cleanup interval for stale sessions.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Outgoing message buffer per session.
const CHANNEL_CAPACITY: usize = 64;

/// A single legacy SSE session.
pub struct SseSession {
    /// Generated session identifier.
    pub id: String,
    /// Credential resolved when the stream was opened.
    pub credential: Option<Credential>,
    tx: mpsc::Sender<JsonRpcResponse>,
    last_active: RwLock<Instant>,
}

impl SseSession {
    /// Deliver a response over the session's event stream.
    ///
    /// Returns false if the stream side is gone.
    pub async fn send(&self, response: JsonRpcResponse) -> bool {
        *self.last_active.write().await = Instant::now();
        self.tx.send(response).await.is_ok()
    }

    async fn is_stale(&self) -> bool {
        self.last_active.read().await.elapsed() > SESSION_TIMEOUT
    }
}

/// In-memory table of live legacy SSE sessions.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Arc<SseSession>>>>,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Create a session for a new connection. Returns the session and the
    /// receiving end of its outgoing message channel.
    pub async fn create_session(
        &self,
        credential: Option<Credential>,
    ) -> (Arc<SseSession>, mpsc::Receiver<JsonRpcResponse>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let session = Arc::new(SseSession {
            id: uuid::Uuid::new_v4().to_string(),
            credential,
            tx,
            last_active: RwLock::new(Instant::now()),
        });

        self.sessions.write().await.insert(session.id.clone(), Arc::clone(&session));

        (session, rx)
    }

    /// Look up a session by id.
    pub async fn get(&self, session_id: &str) -> Option<Arc<SseSession>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Any live session (the legacy message endpoint accepts requests
    /// without a session id and routes them to the first open stream).
    pub async fn any(&self) -> Option<Arc<SseSession>> {
        self.sessions.read().await.values().next().cloned()
    }

    /// Remove a session (connection closed).
    pub async fn remove(&self, session_id: &str) {
        if self.sessions.write().await.remove(session_id).is_some() {
            tracing::info!(session_id, "Legacy SSE session closed");
        }
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Start the background sweep of stale sessions.
    pub fn start_cleanup_task(&self) {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                manager.cleanup_stale().await;
            }
        });
    }

    async fn cleanup_stale(&self) {
        let stale: Vec<String> = {
            let sessions = self.sessions.read().await;
            let mut stale = Vec::new();
            for (id, session) in sessions.iter() {
                if session.is_stale().await {
                    stale.push(id.clone());
                }
            }
            stale
        };

        for id in stale {
            tracing::debug!(session_id = %id, "Removing stale SSE session");
            self.remove(&id).await;
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the session from the table when the SSE stream is dropped.
pub struct SessionGuard {
    manager: SessionManager,
    session_id: String,
}

impl SessionGuard {
    #[must_use]
    pub fn new(manager: SessionManager, session_id: String) -> Self {
        Self { manager, session_id }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let manager = self.manager.clone();
        let session_id = std::mem::take(&mut self.session_id);
        tokio::spawn(async move {
            manager.remove(&session_id).await;
        });
    }
}
