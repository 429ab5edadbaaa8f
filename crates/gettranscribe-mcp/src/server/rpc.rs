//! JSON-RPC 2.0 envelope types and the shared MCP method handler.
//!
//! Every transport funnels requests through [`handle_request`], a pure
//! function of the request plus the per-request credential. No mutable state
//! is shared between concurrent callers; that is the isolation guarantee the
//! stateless HTTP transport relies on.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::auth::Credential;
use crate::config::api::PROTOCOL_VERSION;
use crate::tools::{definitions, Dispatcher, TransportKind};

use super::resources;

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Notifications carry no id and expect no response.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Standard JSON-RPC error codes used by this server.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const SERVER_ERROR: i32 = -32000;
}

impl JsonRpcResponse {
    const VERSION: &'static str = "2.0";

    #[must_use]
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self { jsonrpc: Cow::Borrowed(Self::VERSION), result: Some(result), error: None, id }
    }

    #[must_use]
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
            id,
        }
    }
}

/// Handle one MCP request. Returns `None` for notifications.
pub async fn handle_request(
    req: &JsonRpcRequest,
    dispatcher: &Dispatcher,
    credential: Option<&Credential>,
    transport: TransportKind,
) -> Option<JsonRpcResponse> {
    let response = match req.method.as_str() {
        "initialize" => handle_initialize(req.id.clone(), &req.params),
        "notifications/initialized" | "initialized" | "notifications/cancelled" => {
            if req.is_notification() {
                return None;
            }
            JsonRpcResponse::success(req.id.clone(), serde_json::json!({}))
        }
        "ping" => JsonRpcResponse::success(req.id.clone(), serde_json::json!({})),
        "tools/list" => handle_tools_list(req.id.clone()),
        "tools/call" => {
            handle_tools_call(req.id.clone(), &req.params, dispatcher, credential, transport)
                .await
        }
        "resources/list" => {
            JsonRpcResponse::success(req.id.clone(), resources::list_resources())
        }
        "resources/templates/list" => {
            JsonRpcResponse::success(req.id.clone(), resources::list_resource_templates())
        }
        "resources/read" => handle_resources_read(req.id.clone(), &req.params),
        _ => {
            if req.is_notification() {
                return None;
            }
            JsonRpcResponse::error(
                req.id.clone(),
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", req.method),
            )
        }
    };

    Some(response)
}

fn handle_initialize(id: Option<serde_json::Value>, params: &serde_json::Value) -> JsonRpcResponse {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    tracing::info!(protocol_version, "MCP initialize");

    JsonRpcResponse::success(
        id,
        serde_json::json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": true },
                "resources": {}
            },
            "serverInfo": {
                "name": "gettranscribe",
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

fn handle_tools_list(id: Option<serde_json::Value>) -> JsonRpcResponse {
    let tools: Vec<serde_json::Value> =
        definitions().iter().map(|def| def.to_list_entry()).collect();

    JsonRpcResponse::success(id, serde_json::json!({ "tools": tools }))
}

async fn handle_tools_call(
    id: Option<serde_json::Value>,
    params: &serde_json::Value,
    dispatcher: &Dispatcher,
    credential: Option<&Credential>,
    transport: TransportKind,
) -> JsonRpcResponse {
    let Some(tool_name) = params.get("name").and_then(|v| v.as_str()) else {
        return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing 'name' parameter");
    };

    let arguments = params.get("arguments").cloned().unwrap_or_else(|| serde_json::json!({}));

    let result = dispatcher.dispatch(tool_name, arguments, credential, transport).await;

    JsonRpcResponse::success(id, result.into_json())
}

fn handle_resources_read(
    id: Option<serde_json::Value>,
    params: &serde_json::Value,
) -> JsonRpcResponse {
    let Some(uri) = params.get("uri").and_then(|v| v.as_str()) else {
        return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing 'uri' parameter");
    };

    match resources::read_resource(uri) {
        Some(contents) => JsonRpcResponse::success(id, contents),
        None => {
            JsonRpcResponse::error(id, codes::INVALID_PARAMS, format!("Unknown resource: {uri}"))
        }
    }
}
