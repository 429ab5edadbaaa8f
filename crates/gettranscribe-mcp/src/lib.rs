//! GetTranscribe MCP Server
//!
//! A Model Context Protocol (MCP) server for the GetTranscribe transcription
//! API. Enables LLM agents to create and browse video transcriptions and
//! transcription folders across supported platforms.
//!
//! # Features
//!
//! - **8 MCP Tools**: Transcription creation, retrieval, listing, folders,
//!   connector-style search and fetch
//! - **Three transports**: stdio, stateless Streamable HTTP, legacy SSE
//! - **Embedded OAuth 2.0**: Authorization-code flow whose access tokens
//!   carry the user's GetTranscribe API key
//! - **Per-request credentials**: Each HTTP request resolves its own upstream
//!   key, so one deployment serves many users
//!
//! # Example
//!
//! ```no_run
//! use gettranscribe_mcp::{config::Config, server::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     McpServer::new(config)?.run_stdio().await
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod server;
pub mod tools;

pub use client::GetTranscribeClient;
pub use config::Config;
pub use error::{ClientError, ToolError};
