//! MCP server implementation.
//!
//! Three transports over one shared request handler:
//! - stdio for desktop MCP clients
//! - Streamable HTTP (stateless, per-request credentials)
//! - legacy SSE for older connector clients
//!
//! The HTTP surface additionally hosts the embedded OAuth authorization
//! server and its discovery document.

pub mod http;
pub mod oauth;
pub mod resources;
pub mod rpc;
pub mod session;
pub mod stdio;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::OAuthStore;
use crate::client::GetTranscribeClient;
use crate::config::Config;
use crate::tools::Dispatcher;

/// MCP server for GetTranscribe.
pub struct McpServer {
    config: Config,
    dispatcher: Dispatcher,
    oauth_store: Arc<OAuthStore>,
}

impl McpServer {
    /// Create a new MCP server.
    ///
    /// # Errors
    ///
    /// Returns error if the upstream HTTP client cannot be built.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = GetTranscribeClient::new(&config)?;
        let dispatcher = Dispatcher::new(client);

        Ok(Self { config, dispatcher, oauth_store: Arc::new(OAuthStore::new()) })
    }

    /// Run the server in stdio mode.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server in stdio mode");

        stdio::run_stdio(self.dispatcher, self.config.default_api_key).await
    }

    /// Run the server in HTTP mode.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self) -> anyhow::Result<()> {
        let port = self.config.port;

        tracing::info!(port, mcp_path = %self.config.mcp_path, "Starting MCP server in HTTP mode");

        let router = http::create_router(&self.config, self.dispatcher, self.oauth_store);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("mcp_path", &self.config.mcp_path).finish()
    }
}

/// Public base URL of the inbound request, honoring `x-forwarded-proto`
/// from a TLS-terminating proxy.
#[must_use]
pub fn request_base_url(headers: &HeaderMap) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{proto}://{host}")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        return;
    }
    tracing::info!("Received shutdown signal");
}
