//! GetTranscribe MCP Server - Entry Point
//!
//! Provides stdio, Streamable HTTP and legacy SSE transports.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gettranscribe_mcp::{config::Config, server::McpServer};

#[derive(Parser, Debug)]
#[command(name = "gettranscribe-mcp")]
#[command(about = "MCP server for the GetTranscribe transcription API")]
#[command(version)]
struct Cli {
    /// Default GetTranscribe API key (optional, requests may carry their own)
    #[arg(long, env = "GETTRANSCRIBE_API_KEY")]
    api_key: Option<String>,

    /// Transport mode: stdio or http (PORT in the environment implies http)
    #[arg(long, env = "MCP_TRANSPORT")]
    transport: Option<Transport>,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8080", env = "PORT")]
    port: u16,

    /// Path the MCP endpoint is served on
    #[arg(long, default_value = "/mcp", env = "MCP_PATH")]
    mcp_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Transport {
    /// Standard input/output (for desktop MCP clients)
    Stdio,
    /// HTTP with Streamable HTTP and legacy SSE endpoints
    Http,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // Stdout carries the protocol in stdio mode; logs go to stderr.
    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    // Hosted platforms set PORT and nothing else; treat it as opting in to HTTP.
    let transport = cli.transport.unwrap_or_else(|| {
        if std::env::var("PORT").is_ok() { Transport::Http } else { Transport::Stdio }
    });

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?transport,
        "Starting GetTranscribe MCP server"
    );

    let mut config = Config::from_env()?;
    if cli.api_key.is_some() {
        config.default_api_key = cli.api_key;
    }
    config.port = cli.port;
    config.mcp_path = cli.mcp_path;

    let server = McpServer::new(config)?;

    match transport {
        Transport::Stdio => server.run_stdio().await?,
        Transport::Http => server.run_http().await?,
    }

    Ok(())
}
