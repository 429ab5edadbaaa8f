//! End-to-end credential resolution over the HTTP transport.
//!
//! Each test asserts which API key actually reaches the upstream, using a
//! mocked upstream that matches on the `x-api-key` header.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gettranscribe_mcp::auth::{OAuthStore, TokenIssuer};
use gettranscribe_mcp::client::GetTranscribeClient;
use gettranscribe_mcp::config::Config;
use gettranscribe_mcp::server::http::create_router;
use gettranscribe_mcp::tools::Dispatcher;

fn router_for(api_url: &str, default_api_key: Option<&str>) -> axum::Router {
    let mut config = Config::for_testing(api_url);
    config.default_api_key = default_api_key.map(str::to_string);
    let client = GetTranscribeClient::new(&config).unwrap();

    create_router(&config, Dispatcher::new(client), Arc::new(OAuthStore::new()))
}

fn call_tool_request(builder: axum::http::request::Builder) -> Request<Body> {
    builder
        .uri("/mcp")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "jsonrpc": "2.0",
                "method": "tools/call",
                "params": {"name": "list_transcriptions", "arguments": {}},
                "id": 1
            })
            .to_string(),
        ))
        .unwrap()
}

async fn result_json(response: axum::response::Response) -> serde_json::Value {
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    json["result"].clone()
}

fn upstream_ok() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"content": [{"type": "text", "text": "ok"}]}))
}

#[tokio::test]
async fn test_x_api_key_header_reaches_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("x-api-key", "gtr_direct"))
        .respond_with(upstream_ok())
        .expect(1)
        .mount(&server)
        .await;

    let app = router_for(&server.uri(), None);
    let response = app
        .oneshot(call_tool_request(Request::builder().header("x-api-key", "gtr_direct")))
        .await
        .unwrap();

    let result = result_json(response).await;
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn test_bearer_access_token_unwraps_to_embedded_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("x-api-key", "gtr_embedded"))
        .respond_with(upstream_ok())
        .expect(1)
        .mount(&server)
        .await;

    // Sign with the same secret Config::for_testing carries.
    let token = TokenIssuer::new("gettranscribe-jwt-secret-2024").issue("gtr_embedded").unwrap();

    let app = router_for(&server.uri(), None);
    let response = app
        .oneshot(call_tool_request(
            Request::builder().header("Authorization", format!("Bearer {token}")),
        ))
        .await
        .unwrap();

    let result = result_json(response).await;
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn test_raw_api_key_as_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("x-api-key", "gtr_raw"))
        .respond_with(upstream_ok())
        .expect(1)
        .mount(&server)
        .await;

    let app = router_for(&server.uri(), None);
    let response = app
        .oneshot(call_tool_request(Request::builder().header("Authorization", "Bearer gtr_raw")))
        .await
        .unwrap();

    let result = result_json(response).await;
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn test_header_takes_precedence_over_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("x-api-key", "gtr_request"))
        .respond_with(upstream_ok())
        .expect(1)
        .mount(&server)
        .await;

    let app = router_for(&server.uri(), Some("gtr_default"));
    let response = app
        .oneshot(call_tool_request(Request::builder().header("x-api-key", "gtr_request")))
        .await
        .unwrap();

    let result = result_json(response).await;
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn test_default_key_used_when_no_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("x-api-key", "gtr_default"))
        .respond_with(upstream_ok())
        .expect(1)
        .mount(&server)
        .await;

    let app = router_for(&server.uri(), Some("gtr_default"));
    let response = app.oneshot(call_tool_request(Request::builder())).await.unwrap();

    let result = result_json(response).await;
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn test_no_credential_is_tool_error_not_protocol_fault() {
    let server = MockServer::start().await;

    Mock::given(method("POST")).and(path("/mcp")).respond_with(upstream_ok())
        .expect(0)
        .mount(&server)
        .await;

    let app = router_for(&server.uri(), None);
    let response = app.oneshot(call_tool_request(Request::builder())).await.unwrap();

    let result = result_json(response).await;
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"].as_str().unwrap().contains("API key required"));
}

#[tokio::test]
async fn test_concurrent_requests_keep_their_own_keys() {
    let server = MockServer::start().await;

    for key in ["gtr_user_a", "gtr_user_b"] {
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(header("x-api-key", key))
            .respond_with(upstream_ok())
            .expect(1)
            .mount(&server)
            .await;
    }

    let app = router_for(&server.uri(), None);

    let (a, b) = tokio::join!(
        app.clone().oneshot(call_tool_request(Request::builder().header("x-api-key", "gtr_user_a"))),
        app.clone().oneshot(call_tool_request(Request::builder().header("x-api-key", "gtr_user_b"))),
    );

    assert!(result_json(a.unwrap()).await.get("isError").is_none());
    assert!(result_json(b.unwrap()).await.get("isError").is_none());
}
