//! In-memory OAuth state store.
//!
//! Process-scoped and injected into the handlers (never a global), so tests
//! can construct isolated instances. All state is lost on restart, which is
//! an explicit scope limitation of this server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::config::api::AUTH_CODE_LIFETIME;
use crate::config::OAuthClientConfig;

/// Cleanup interval for expired authorization codes.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// A pending authorization code.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthCode {
    /// API key the approving user submitted.
    pub api_key: String,
    /// Client the code was issued to.
    pub client_id: String,
    /// When the code was created.
    pub created_at: Instant,
}

impl AuthCode {
    /// Check if the code has expired (10 minute lifetime).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() > AUTH_CODE_LIFETIME
    }
}

/// A dynamically registered OAuth client.
#[derive(Debug, Clone)]
pub struct RegisteredClient {
    /// Generated client identifier.
    pub client_id: String,
    /// Generated client secret.
    pub client_secret: String,
    /// Name declared at registration.
    pub client_name: Option<String>,
    /// Redirect URIs declared at registration.
    pub redirect_uris: Vec<String>,
    /// Registration time (Unix seconds).
    pub created_at: i64,
}

/// Why consuming an authorization code failed.
///
/// Each variant maps to a distinct OAuth error description; the protocol
/// requires one of a small set of standard error codes, never a generic
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeError {
    /// The code was never issued, already used, or deleted.
    NotFound,
    /// The code exists but its 10-minute lifetime has elapsed.
    Expired,
    /// The code was issued to a different client.
    ClientMismatch,
}

/// In-memory OAuth state store.
#[derive(Clone)]
pub struct OAuthStore {
    auth_codes: Arc<RwLock<HashMap<String, AuthCode>>>,
    clients: Arc<RwLock<HashMap<String, RegisteredClient>>>,
}

impl OAuthStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            auth_codes: Arc::new(RwLock::new(HashMap::new())),
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record a freshly issued authorization code.
    pub async fn insert_auth_code(&self, code: String, api_key: String, client_id: String) {
        self.auth_codes
            .write()
            .await
            .insert(code, AuthCode { api_key, client_id, created_at: Instant::now() });
    }

    /// Consume an authorization code (single use).
    ///
    /// Validations run in order: code exists, code not expired, code issued
    /// to the presented client. Successful consumption deletes the code while
    /// holding the write lock, so under concurrent exchange attempts only the
    /// first caller wins and the rest see `NotFound`. Expired codes are also
    /// deleted on sight.
    ///
    /// # Errors
    ///
    /// Returns the specific validation failure.
    pub async fn consume_auth_code(
        &self,
        code: &str,
        client_id: &str,
    ) -> Result<AuthCode, CodeError> {
        let mut codes = self.auth_codes.write().await;

        let entry = codes.get(code).ok_or(CodeError::NotFound)?;

        if entry.is_expired() {
            codes.remove(code);
            return Err(CodeError::Expired);
        }

        if entry.client_id != client_id {
            return Err(CodeError::ClientMismatch);
        }

        codes.remove(code).ok_or(CodeError::NotFound)
    }

    /// Register a new OAuth client (dynamic registration).
    ///
    /// Generated identifiers carry a `chatgpt_` prefix so they are
    /// distinguishable from the static configured client.
    pub async fn register_client(
        &self,
        client_name: Option<String>,
        redirect_uris: Vec<String>,
    ) -> RegisteredClient {
        let client = RegisteredClient {
            client_id: format!("chatgpt_{}", uuid::Uuid::new_v4()),
            client_secret: uuid::Uuid::new_v4().to_string(),
            client_name,
            redirect_uris,
            created_at: chrono::Utc::now().timestamp(),
        };

        self.clients.write().await.insert(client.client_id.clone(), client.clone());

        client
    }

    /// Check whether a client identifier is known (static or registered).
    pub async fn is_known_client(&self, client_id: &str, static_client: &OAuthClientConfig) -> bool {
        if client_id == static_client.client_id {
            return true;
        }
        self.clients.read().await.contains_key(client_id)
    }

    /// Validate client credentials against the static client and the
    /// registered-client table. Both paths are checked for every token
    /// request.
    pub async fn validate_client(
        &self,
        client_id: &str,
        client_secret: &str,
        static_client: &OAuthClientConfig,
    ) -> bool {
        if client_id == static_client.client_id {
            return client_secret == static_client.client_secret;
        }

        self.clients
            .read()
            .await
            .get(client_id)
            .is_some_and(|c| c.client_secret == client_secret)
    }

    /// Number of registered clients.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Start the background sweep of expired authorization codes.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                self.cleanup_expired().await;
            }
        });
    }

    async fn cleanup_expired(&self) {
        let mut codes = self.auth_codes.write().await;
        let before = codes.len();
        codes.retain(|_, code| !code.is_expired());
        let removed = before - codes.len();
        if removed > 0 {
            tracing::debug!(count = removed, "Cleaned up expired authorization codes");
        }
    }
}

impl Default for OAuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OAuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthStore").finish()
    }
}
