//! Integration tests for the OAuth 2.0 authorization flow.
//!
//! Covers discovery, allow-listed registration, the authorization page,
//! code issuance, and token exchange with its full error-code matrix.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use serde_json::json;
use tower::ServiceExt;

use gettranscribe_mcp::auth::{OAuthStore, TokenIssuer};
use gettranscribe_mcp::client::GetTranscribeClient;
use gettranscribe_mcp::config::Config;
use gettranscribe_mcp::server::http::create_router;
use gettranscribe_mcp::tools::Dispatcher;

const STATIC_CLIENT_ID: &str = "gettranscribe-mcp";
const STATIC_CLIENT_SECRET: &str = "mcp-secret-2024";
const REDIRECT_URI: &str = "https://chatgpt.com/connector_platform_oauth_redirect";

fn build_test_router() -> axum::Router {
    let config = Config::for_testing("http://unused.localhost");
    let client = GetTranscribeClient::new(&config).unwrap();

    create_router(&config, Dispatcher::new(client), Arc::new(OAuthStore::new()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn form_request(uri: &str, params: &[(&str, &str)]) -> Request<Body> {
    Request::post(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(params).unwrap()))
        .unwrap()
}

/// Drive the authorization flow and return the issued code.
async fn obtain_auth_code(app: &axum::Router, api_key: &str) -> String {
    let response = app
        .clone()
        .oneshot(form_request(
            "/oauth/authorize",
            &[
                ("client_id", STATIC_CLIENT_ID),
                ("redirect_uri", REDIRECT_URI),
                ("state", "st4te"),
                ("api_key", api_key),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers().get("location").unwrap().to_str().unwrap();
    let redirect = url::Url::parse(location).unwrap();

    assert!(location.starts_with(REDIRECT_URI));
    assert_eq!(
        redirect.query_pairs().find(|(k, _)| k == "state").unwrap().1,
        "st4te"
    );

    redirect.query_pairs().find(|(k, _)| k == "code").unwrap().1.into_owned()
}

// ─── Discovery ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_discovery_document() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::get("/.well-known/oauth-authorization-server")
                .header("host", "mcp.example.com")
                .header("x-forwarded-proto", "https")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["issuer"], "https://mcp.example.com");
    assert_eq!(json["authorization_endpoint"], "https://mcp.example.com/oauth/authorize");
    assert_eq!(json["token_endpoint"], "https://mcp.example.com/oauth/token");
    assert_eq!(json["registration_endpoint"], "https://mcp.example.com/oauth/register");
    assert!(json["grant_types_supported"].as_array().unwrap().contains(&json!("authorization_code")));
}

// ─── Dynamic Client Registration ─────────────────────────────────────────────

#[tokio::test]
async fn test_register_allowed_client() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::post("/oauth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({
                        "client_name": "ChatGPT Connector",
                        "redirect_uris": [REDIRECT_URI]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    assert!(json["client_id"].as_str().unwrap().starts_with("chatgpt_"));
    assert!(json["client_secret"].as_str().is_some());
    assert_eq!(json["client_name"], "ChatGPT Connector");
    assert_eq!(json["redirect_uris"][0], REDIRECT_URI);
}

#[tokio::test]
async fn test_register_rejects_unknown_application() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::post("/oauth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({
                        "client_name": "randomApp",
                        "redirect_uris": ["https://evil.example/cb"]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_client_metadata");
}

// ─── Authorization endpoint ──────────────────────────────────────────────────

#[tokio::test]
async fn test_authorize_page_renders_for_known_client() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::get(format!(
                "/oauth/authorize?client_id={STATIC_CLIENT_ID}&redirect_uri={REDIRECT_URI}&response_type=code&state=xyz"
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("api_key"));
    assert!(html.contains(STATIC_CLIENT_ID));
}

#[tokio::test]
async fn test_authorize_rejects_unknown_client() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::get("/oauth/authorize?client_id=nobody&response_type=code")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_client_id");
}

#[tokio::test]
async fn test_authorize_rejects_wrong_response_type() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::get(format!(
                "/oauth/authorize?client_id={STATIC_CLIENT_ID}&response_type=token"
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "unsupported_response_type");
}

#[tokio::test]
async fn test_authorize_rejects_malformed_api_key() {
    let app = build_test_router();

    let response = app
        .oneshot(form_request(
            "/oauth/authorize",
            &[
                ("client_id", STATIC_CLIENT_ID),
                ("redirect_uri", REDIRECT_URI),
                ("api_key", "sk-not-a-gettranscribe-key"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ─── Token exchange ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_flow_token_carries_api_key() {
    let app = build_test_router();
    let code = obtain_auth_code(&app, "gtr_flow_key").await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/oauth/token",
            &[
                ("grant_type", "authorization_code"),
                ("code", &code),
                ("client_id", STATIC_CLIENT_ID),
                ("client_secret", STATIC_CLIENT_SECRET),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("cache-control").unwrap(), "no-store");
    let json = body_json(response).await;

    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 86_400);

    // The access token embeds the API key the user submitted.
    let issuer = TokenIssuer::new("gettranscribe-jwt-secret-2024");
    let api_key = issuer.verify(json["access_token"].as_str().unwrap()).unwrap();
    assert_eq!(api_key, "gtr_flow_key");
}

#[tokio::test]
async fn test_token_exchange_with_basic_auth() {
    let app = build_test_router();
    let code = obtain_auth_code(&app, "gtr_basic_key").await;

    let basic = base64::engine::general_purpose::STANDARD
        .encode(format!("{STATIC_CLIENT_ID}:{STATIC_CLIENT_SECRET}"));

    let response = app
        .clone()
        .oneshot(
            Request::post("/oauth/token")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .header("Authorization", format!("Basic {basic}"))
                .body(Body::from(
                    serde_urlencoded::to_string([
                        ("grant_type", "authorization_code"),
                        ("code", code.as_str()),
                    ])
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["access_token"].as_str().is_some());
}

#[tokio::test]
async fn test_auth_code_is_single_use() {
    let app = build_test_router();
    let code = obtain_auth_code(&app, "gtr_once").await;

    let params = [
        ("grant_type", "authorization_code"),
        ("code", code.as_str()),
        ("client_id", STATIC_CLIENT_ID),
        ("client_secret", STATIC_CLIENT_SECRET),
    ];

    let first = app.clone().oneshot(form_request("/oauth/token", &params)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(form_request("/oauth/token", &params)).await.unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(second).await["error"], "invalid_grant");
}

#[tokio::test]
async fn test_token_rejects_wrong_client_secret() {
    let app = build_test_router();
    let code = obtain_auth_code(&app, "gtr_secret").await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/oauth/token",
            &[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("client_id", STATIC_CLIENT_ID),
                ("client_secret", "wrong"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_client");
}

#[tokio::test]
async fn test_token_rejects_missing_client_secret() {
    let app = build_test_router();
    let code = obtain_auth_code(&app, "gtr_nosecret").await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/oauth/token",
            &[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("client_id", STATIC_CLIENT_ID),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_client");
}

#[tokio::test]
async fn test_token_rejects_foreign_client_code() {
    let app = build_test_router();

    // Register a second client.
    let registration = app
        .clone()
        .oneshot(
            Request::post("/oauth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({"client_name": "ChatGPT", "redirect_uris": [REDIRECT_URI]}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let registered = body_json(registration).await;

    // Code issued to the static client, exchanged by the registered one.
    let code = obtain_auth_code(&app, "gtr_mismatch").await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/oauth/token",
            &[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("client_id", registered["client_id"].as_str().unwrap()),
                ("client_secret", registered["client_secret"].as_str().unwrap()),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_grant");
}

#[tokio::test]
async fn test_token_rejects_unsupported_grant_type() {
    let app = build_test_router();

    let response = app
        .oneshot(form_request(
            "/oauth/token",
            &[
                ("grant_type", "client_credentials"),
                ("client_id", STATIC_CLIENT_ID),
                ("client_secret", STATIC_CLIENT_SECRET),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "unsupported_grant_type");
}

#[tokio::test]
async fn test_token_rejects_missing_grant_type() {
    let app = build_test_router();

    let response = app
        .oneshot(form_request(
            "/oauth/token",
            &[
                ("client_id", STATIC_CLIENT_ID),
                ("client_secret", STATIC_CLIENT_SECRET),
                ("code", "whatever"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_request");
}
