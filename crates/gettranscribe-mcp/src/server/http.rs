//! HTTP transports.
//!
//! Two MCP transports share one router:
//! - Streamable HTTP: `POST {mcp_path}` is fully stateless, each request
//!   carries its own credential and gets an immediate JSON response.
//! - Legacy SSE: `GET /sse` opens an event stream; `POST /messages` routes
//!   requests to that stream's session and delivers responses as events.
//!
//! The OAuth endpoints and discovery document live on the same router so a
//! single listener serves the whole connector surface.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{resolve_credential, Credential, OAuthStore, TokenIssuer};
use crate::config::{Config, OAuthClientConfig, RegistrationPolicy};
use crate::tools::{Dispatcher, ToolName, TransportKind};

use super::oauth;
use super::request_base_url;
use super::rpc::{self, codes, JsonRpcRequest, JsonRpcResponse};
use super::session::{SessionGuard, SessionManager};

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub dispatcher: Dispatcher,
    pub issuer: TokenIssuer,
    pub oauth_store: Arc<OAuthStore>,
    pub oauth_client: OAuthClientConfig,
    pub registration_policy: RegistrationPolicy,
    pub default_api_key: Option<String>,
    pub mcp_path: String,
    pub sessions: SessionManager,
}

impl HttpState {
    fn resolve(&self, headers: &HeaderMap) -> Option<Credential> {
        resolve_credential(headers, &self.issuer, self.default_api_key.as_deref())
    }
}

/// Query parameters for the legacy message endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Create the HTTP router.
pub fn create_router(config: &Config, dispatcher: Dispatcher, oauth_store: Arc<OAuthStore>) -> Router {
    let sessions = SessionManager::new();
    sessions.start_cleanup_task();
    Arc::clone(&oauth_store).start_cleanup_task();

    let state = Arc::new(HttpState {
        dispatcher,
        issuer: TokenIssuer::new(&config.jwt_secret),
        oauth_store,
        oauth_client: config.oauth_client.clone(),
        registration_policy: config.registration_policy.clone(),
        default_api_key: config.default_api_key.clone(),
        mcp_path: config.mcp_path.clone(),
        sessions,
    });

    Router::new()
        .route("/", get(handle_status))
        .route("/health", get(handle_status))
        // Streamable HTTP transport, configurable path
        .route(
            &state.mcp_path,
            post(handle_mcp_post).get(handle_mcp_method_not_allowed).delete(handle_mcp_method_not_allowed),
        )
        // Legacy SSE transport
        .route("/sse", get(handle_sse))
        .route("/messages", post(handle_messages_post))
        // OAuth authorization server
        .route(
            "/oauth/authorize",
            get(oauth::handle_authorize_get).post(oauth::handle_authorize_post),
        )
        .route("/oauth/token", post(oauth::handle_token))
        .route("/oauth/register", post(oauth::handle_register))
        .route("/.well-known/oauth-authorization-server", get(oauth::handle_discovery))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Status page served on `/` and `/health`: endpoints and the tool catalog.
async fn handle_status(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> impl IntoResponse {
    let base_url = request_base_url(&headers);
    let tools: Vec<&str> = ToolName::ALL.iter().map(|t| t.as_str()).collect();

    Json(serde_json::json!({
        "status": "ok",
        "service": "gettranscribe-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "mcp",
        "endpoint": format!("{base_url}{}", state.mcp_path),
        "sse_endpoint": format!("{base_url}/sse"),
        "authorization": format!("{base_url}/.well-known/oauth-authorization-server"),
        "tools": tools
    }))
}

/// Handle `POST {mcp_path}` (Streamable HTTP transport).
///
/// Stateless: the credential is resolved from this request's headers alone
/// and never outlives the call.
async fn handle_mcp_post(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let req: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(req) => req,
        Err(e) => {
            return Json(JsonRpcResponse::error(
                None,
                codes::PARSE_ERROR,
                format!("Parse error: {e}"),
            ))
            .into_response();
        }
    };

    tracing::debug!(method = %req.method, "Handling MCP POST request");

    let credential = state.resolve(&headers);

    match rpc::handle_request(&req, &state.dispatcher, credential.as_ref(), TransportKind::Http)
        .await
    {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// The streamable endpoint accepts POST only.
async fn handle_mcp_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(JsonRpcResponse::error(None, codes::SERVER_ERROR, "Method not allowed")),
    )
        .into_response()
}

/// Handle `GET /sse` (legacy SSE transport).
///
/// Opens the event stream and announces the per-session message endpoint as
/// the first event. The credential resolved here is pinned to the session
/// for its lifetime.
async fn handle_sse(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> impl IntoResponse {
    let credential = state.resolve(&headers);
    let (session, rx) = state.sessions.create_session(credential).await;

    tracing::info!(session_id = %session.id, "New legacy SSE connection");

    let endpoint = format!(
        "{}/messages?sessionId={}",
        request_base_url(&headers),
        session.id
    );

    let guard = SessionGuard::new(state.sessions.clone(), session.id.clone());
    let stream = sse_stream(endpoint, rx, guard);

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
}

/// Endpoint announcement followed by the session's response events. The
/// guard rides inside the stream so the session is removed when the client
/// disconnects and the stream is dropped.
fn sse_stream(
    endpoint: String,
    rx: tokio::sync::mpsc::Receiver<JsonRpcResponse>,
    guard: SessionGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let endpoint_event = futures::stream::once(async move {
        Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint))
    });

    let message_events = ReceiverStream::new(rx).map(move |response| {
        let _keep_alive = &guard;
        let data = serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string());
        Ok::<_, Infallible>(Event::default().event("message").data(data))
    });

    endpoint_event.chain(message_events)
}

/// Handle `POST /messages` (legacy SSE transport).
///
/// The response travels over the session's event stream; the HTTP reply is
/// just an acknowledgement.
async fn handle_messages_post(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<MessageQuery>,
    Json(req): Json<JsonRpcRequest>,
) -> Response {
    let session = match query.session_id.as_deref() {
        Some(id) => state.sessions.get(id).await,
        None => state.sessions.any().await,
    };

    let Some(session) = session else {
        return (
            StatusCode::BAD_REQUEST,
            Json(JsonRpcResponse::error(req.id, codes::SERVER_ERROR, "No active SSE session")),
        )
            .into_response();
    };

    tracing::debug!(method = %req.method, session_id = %session.id, "Handling legacy message");

    let response = rpc::handle_request(
        &req,
        &state.dispatcher,
        session.credential.as_ref(),
        TransportKind::Http,
    )
    .await;

    if let Some(response) = response {
        if !session.send(response).await {
            tracing::warn!(session_id = %session.id, "SSE stream gone, dropping response");
        }
    }

    StatusCode::OK.into_response()
}
