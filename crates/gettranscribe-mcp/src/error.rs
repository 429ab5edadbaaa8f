//! Error types for the GetTranscribe MCP server.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

/// Errors from the upstream HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Non-2xx response from the upstream API
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },
}

impl ClientError {
    /// Create an upstream error from a status and response body.
    ///
    /// Prefers the `message` field of a JSON error body when present.
    #[must_use]
    pub fn upstream(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| body.to_string());

        Self::Upstream { status, message }
    }

    /// The message to surface to the calling assistant.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Upstream { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors from MCP tool dispatch.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Error from the upstream API client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// No credential could be resolved for the request
    #[error("API key required")]
    MissingCredential {
        /// Remediation hint naming the header or environment variable to set
        hint: String,
    },

    /// Tool name outside the supported catalog
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Input validation failed
    #[error("Invalid input for '{field}': {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Convert to a user-friendly message for the MCP error result.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(e) => format!("Error: {}", e.user_message()),
            Self::MissingCredential { hint } => format!("API key required. {hint}"),
            Self::UnknownTool(name) => format!("Unknown tool: {name}"),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
