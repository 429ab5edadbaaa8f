//! Configuration for the GetTranscribe MCP server.

use std::time::Duration;

/// API and protocol constants.
pub mod api {
    use std::time::Duration;

    /// Default base URL for the GetTranscribe API.
    pub const BASE_URL: &str = "https://api.gettranscribe.ai";

    /// Prefix every GetTranscribe API key carries.
    pub const API_KEY_PREFIX: &str = "gtr_";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Access token lifetime: 24 hours.
    pub const ACCESS_TOKEN_LIFETIME: u64 = 86_400;

    /// Authorization code lifetime: 10 minutes.
    pub const AUTH_CODE_LIFETIME: u64 = 600;

    /// MCP protocol version advertised when the client does not send one.
    pub const PROTOCOL_VERSION: &str = "2025-06-18";
}

/// OAuth client credentials configured statically (the non-registered path).
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    /// Static client identifier.
    pub client_id: String,
    /// Static client secret.
    pub client_secret: String,
}

/// Allow-list policy for dynamic client registration.
///
/// Registration is deliberately narrowed to known calling applications
/// rather than implementing open RFC 7591 registration.
#[derive(Debug, Clone)]
pub struct RegistrationPolicy {
    /// Case-insensitive substrings accepted in `client_name`.
    pub allowed_name_patterns: Vec<String>,
    /// Substrings accepted in any declared redirect URI.
    pub allowed_redirect_patterns: Vec<String>,
}

impl RegistrationPolicy {
    /// Check a registration request against the policy.
    #[must_use]
    pub fn permits(&self, client_name: Option<&str>, redirect_uris: &[String]) -> bool {
        let name_ok = client_name.is_some_and(|name| {
            let lower = name.to_lowercase();
            self.allowed_name_patterns.iter().any(|p| lower.contains(p.as_str()))
        });
        let uri_ok = redirect_uris
            .iter()
            .any(|uri| self.allowed_redirect_patterns.iter().any(|p| uri.contains(p.as_str())));

        name_ok || uri_ok
    }
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            allowed_name_patterns: vec!["chatgpt".into(), "openai".into()],
            allowed_redirect_patterns: vec!["chatgpt.com".into()],
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream GetTranscribe API.
    pub api_url: String,

    /// Process-wide default API key (optional).
    pub default_api_key: Option<String>,

    /// Static OAuth client credentials.
    pub oauth_client: OAuthClientConfig,

    /// Secret used to sign access tokens.
    pub jwt_secret: String,

    /// Dynamic registration allow-list.
    pub registration_policy: RegistrationPolicy,

    /// HTTP listen port.
    pub port: u16,

    /// Path the MCP endpoint is served on.
    pub mcp_path: String,

    /// Request timeout for upstream calls.
    pub request_timeout: Duration,

    /// Connection timeout for upstream calls.
    pub connect_timeout: Duration,
}

impl Config {
    /// Create a new configuration with explicit upstream settings.
    #[must_use]
    pub fn new(api_url: impl Into<String>, default_api_key: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            default_api_key,
            oauth_client: OAuthClientConfig {
                client_id: "gettranscribe-mcp".to_string(),
                client_secret: "mcp-secret-2024".to_string(),
            },
            jwt_secret: "gettranscribe-jwt-secret-2024".to_string(),
            registration_policy: RegistrationPolicy::default(),
            port: 8080,
            mcp_path: "/mcp".to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
        }
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url =
            std::env::var("GETTRANSCRIBE_API_URL").unwrap_or_else(|_| api::BASE_URL.to_string());
        let default_api_key = std::env::var("GETTRANSCRIBE_API_KEY").ok();

        let mut config = Self::new(api_url, default_api_key);

        if let Ok(id) = std::env::var("OAUTH_CLIENT_ID") {
            config.oauth_client.client_id = id;
        }
        if let Ok(secret) = std::env::var("OAUTH_CLIENT_SECRET") {
            config.oauth_client.client_secret = secret;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if let Ok(port) = std::env::var("PORT") {
            config.port = port.parse()?;
        }
        if let Ok(path) = std::env::var("MCP_PATH") {
            config.mcp_path = path;
        }

        Ok(config)
    }

    /// Create a test configuration pointed at a mock upstream.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let mut config = Self::new(base_url, None);
        config.request_timeout = Duration::from_secs(5);
        config.connect_timeout = Duration::from_secs(2);
        config
    }

    /// Check if a default API key is configured.
    #[must_use]
    pub const fn has_default_api_key(&self) -> bool {
        self.default_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(api::BASE_URL, None)
    }
}

/// Check whether a string looks like a GetTranscribe API key.
#[must_use]
pub fn is_api_key(candidate: &str) -> bool {
    candidate.starts_with(api::API_KEY_PREFIX)
}
