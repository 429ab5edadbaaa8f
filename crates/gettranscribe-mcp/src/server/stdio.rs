//! Stdio transport.
//!
//! Newline-delimited JSON-RPC 2.0 over stdin/stdout. The process-wide
//! default API key is the only credential available here; there are no
//! request headers to resolve from.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::auth::Credential;
use crate::tools::{Dispatcher, TransportKind};

use super::rpc::{self, codes, JsonRpcRequest, JsonRpcResponse};

/// Handle MCP protocol over stdio until stdin closes.
pub async fn run_stdio(dispatcher: Dispatcher, default_api_key: Option<String>) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    let credential = default_api_key.map(Credential::default_key);

    tracing::info!("MCP stdio server ready, waiting for requests...");

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            tracing::info!("Stdin closed, shutting down");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(req) => req,
            Err(e) => {
                let error = JsonRpcResponse::error(
                    None,
                    codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                );
                write_response(&mut stdout, &error).await?;
                continue;
            }
        };

        tracing::debug!(method = %request.method, "Received request");

        let response = rpc::handle_request(
            &request,
            &dispatcher,
            credential.as_ref(),
            TransportKind::Stdio,
        )
        .await;

        if let Some(response) = response {
            write_response(&mut stdout, &response).await?;
        }
    }

    Ok(())
}

async fn write_response(
    stdout: &mut tokio::io::Stdout,
    response: &JsonRpcResponse,
) -> anyhow::Result<()> {
    let json = serde_json::to_string(response)?;
    stdout.write_all(json.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
