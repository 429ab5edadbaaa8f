//! GetTranscribe API client.
//!
//! The upstream exposes a single MCP-shaped endpoint: every tool invocation is
//! a `POST {api_url}/mcp` with the tool name routed inside the request body,
//! authenticated per call with an `x-api-key` header. The credential is never
//! stored on the client so concurrent requests cannot observe each other's key.

use serde::Deserialize;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// One content block of an upstream tool response.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    /// Block type, `"text"` for everything this server consumes.
    #[serde(rename = "type")]
    pub kind: String,

    /// Text payload.
    #[serde(default)]
    pub text: String,
}

/// Response body of an upstream tool call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamToolResponse {
    /// Content blocks (usually a single text block).
    #[serde(default)]
    pub content: Vec<ContentBlock>,

    /// Structured payload, when the upstream returns one directly.
    #[serde(rename = "structuredContent", default)]
    pub structured_content: Option<serde_json::Value>,

    /// Upstream-reported tool failure.
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl UpstreamToolResponse {
    /// Text of the first content block, if any.
    #[must_use]
    pub fn first_text(&self) -> &str {
        self.content.first().map_or("", |block| block.text.as_str())
    }
}

/// HTTP client for the GetTranscribe API.
#[derive(Clone)]
pub struct GetTranscribeClient {
    client: reqwest::Client,
    api_url: String,
}

impl GetTranscribeClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        Ok(Self { client, api_url: config.api_url.clone() })
    }

    /// Base URL of the upstream API.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Invoke an upstream tool.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-2xx upstream response.
    pub async fn call_tool(
        &self,
        api_key: &str,
        name: &str,
        arguments: &serde_json::Value,
    ) -> ClientResult<UpstreamToolResponse> {
        let url = format!("{}/mcp", self.api_url);

        let body = serde_json::json!({
            "method": "tools/call",
            "params": {
                "name": name,
                "arguments": arguments,
            }
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::upstream(status.as_u16(), &text));
        }

        let value: serde_json::Value = response.json().await?;
        serde_json::from_value(value).map_err(ClientError::from)
    }
}

impl std::fmt::Debug for GetTranscribeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetTranscribeClient").field("api_url", &self.api_url).finish()
    }
}
