//! OAuth 2.0 endpoint handlers.
//!
//! Implements the authorization-code grant end to end: authorization page,
//! code issuance, code-for-token exchange, and allow-listed dynamic client
//! registration. Every failure maps to one of the standard OAuth error codes
//! with an HTTP status matching OAuth conventions.

use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use base64::Engine;
use serde::Deserialize;

use crate::auth::CodeError;
use crate::auth::token::generate_auth_code;
use crate::config::is_api_key;

use super::super::http::HttpState;
use super::super::request_base_url;
use super::login::render_authorize_page;

// ─── Authorization endpoint ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub state: Option<String>,
    pub response_type: Option<String>,
}

/// `GET /oauth/authorize`
///
/// Validates the client and renders the API-key form.
pub async fn handle_authorize_get(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<AuthorizeQuery>,
) -> Response {
    let client_id = query.client_id.as_deref().unwrap_or_default();

    tracing::info!(client_id, redirect_uri = ?query.redirect_uri, "OAuth authorization request");

    if !state.oauth_store.is_known_client(client_id, &state.oauth_client).await {
        return oauth_error(StatusCode::BAD_REQUEST, "invalid_client_id", None);
    }

    if query.response_type.as_deref() != Some("code") {
        return oauth_error(StatusCode::BAD_REQUEST, "unsupported_response_type", None);
    }

    Html(render_authorize_page(
        client_id,
        query.redirect_uri.as_deref().unwrap_or_default(),
        query.state.as_deref().unwrap_or_default(),
        "code",
    ))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeForm {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub state: Option<String>,
    pub api_key: Option<String>,
}

/// `POST /oauth/authorize`
///
/// The user approved: validate the submitted key's format, issue a
/// single-use authorization code and redirect back to the client.
pub async fn handle_authorize_post(
    State(state): State<Arc<HttpState>>,
    Form(form): Form<AuthorizeForm>,
) -> Response {
    let Some(api_key) = form.api_key.as_deref().filter(|k| is_api_key(k)) else {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid API key format. Must start with \"gtr_\"",
        )
            .into_response();
    };

    let client_id = form.client_id.unwrap_or_default();
    let Some(redirect_uri) = form.redirect_uri.filter(|u| !u.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing redirect_uri").into_response();
    };

    let code = generate_auth_code();
    state.oauth_store.insert_auth_code(code.clone(), api_key.to_string(), client_id.clone()).await;

    tracing::info!(client_id = %client_id, "Issued authorization code");

    let Ok(mut redirect_url) = url::Url::parse(&redirect_uri) else {
        return (StatusCode::BAD_REQUEST, "Invalid redirect_uri").into_response();
    };
    redirect_url.query_pairs_mut().append_pair("code", &code);
    if let Some(oauth_state) = form.state.filter(|s| !s.is_empty()) {
        redirect_url.query_pairs_mut().append_pair("state", &oauth_state);
    }

    (StatusCode::FOUND, [(header::LOCATION, redirect_url.to_string())]).into_response()
}

// ─── Token endpoint ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// `POST /oauth/token`
///
/// Exchange an authorization code for a signed access token. Client
/// credentials arrive in the form body (`client_secret_post`) or an HTTP
/// Basic header (`client_secret_basic`).
pub async fn handle_token(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    Form(mut form): Form<TokenRequest>,
) -> Response {
    if form.client_id.is_none() {
        match basic_credentials(&headers) {
            Ok(Some((client_id, client_secret))) => {
                form.client_id = Some(client_id);
                form.client_secret = Some(client_secret);
            }
            Ok(None) => {}
            Err(()) => {
                return oauth_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_request",
                    Some("Invalid Basic Auth format"),
                );
            }
        }
    }

    let Some(grant_type) = form.grant_type.as_deref() else {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            Some("Missing grant_type parameter"),
        );
    };

    if grant_type != "authorization_code" {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            Some("Only 'authorization_code' is supported"),
        );
    }

    let Some(code) = form.code.as_deref() else {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            Some("Missing code parameter"),
        );
    };

    let Some(client_id) = form.client_id.as_deref() else {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            Some("Missing client_id parameter"),
        );
    };

    let Some(client_secret) = form.client_secret.as_deref() else {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_client",
            Some("Missing client_secret parameter"),
        );
    };

    if !state.oauth_store.validate_client(client_id, client_secret, &state.oauth_client).await {
        tracing::warn!(client_id, "Invalid client credentials on token request");
        return oauth_error(
            StatusCode::UNAUTHORIZED,
            "invalid_client",
            Some("Invalid client credentials"),
        );
    }

    let grant = match state.oauth_store.consume_auth_code(code, client_id).await {
        Ok(grant) => grant,
        Err(CodeError::NotFound) => {
            return oauth_error(
                StatusCode::BAD_REQUEST,
                "invalid_grant",
                Some("Authorization code not found or invalid"),
            );
        }
        Err(CodeError::Expired) => {
            return oauth_error(
                StatusCode::BAD_REQUEST,
                "invalid_grant",
                Some("Authorization code has expired"),
            );
        }
        Err(CodeError::ClientMismatch) => {
            return oauth_error(
                StatusCode::BAD_REQUEST,
                "invalid_grant",
                Some("Authorization code was issued to a different client"),
            );
        }
    };

    let access_token = match state.issuer.issue(&grant.api_key) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to sign access token");
            return oauth_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", None);
        }
    };

    tracing::info!(client_id, "Issued access token");

    let mut response = Json(serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": crate::config::api::ACCESS_TOKEN_LIFETIME,
    }))
    .into_response();

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

/// Parse client credentials from an `Authorization: Basic` header.
fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, ()> {
    let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };
    let Some(encoded) = value.strip_prefix("Basic ") else {
        return Ok(None);
    };

    let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).map_err(|_| ())?;
    let decoded = String::from_utf8(decoded).map_err(|_| ())?;
    let (client_id, client_secret) = decoded.split_once(':').ok_or(())?;

    Ok(Some((client_id.to_string(), client_secret.to_string())))
}

// ─── Dynamic client registration ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub client_name: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// `POST /oauth/register`
///
/// Allow-listed dynamic registration: only known calling applications
/// (by name or redirect domain) may register. This is a deliberate policy
/// narrowing, not general RFC 7591.
pub async fn handle_register(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    tracing::info!(client_name = ?req.client_name, "Client registration request");

    if !state.registration_policy.permits(req.client_name.as_deref(), &req.redirect_uris) {
        tracing::warn!(client_name = ?req.client_name, "Registration rejected by allow-list");
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_client_metadata",
            Some("This registration endpoint is restricted to known client applications"),
        );
    }

    let client = state.oauth_store.register_client(req.client_name, req.redirect_uris).await;

    tracing::info!(client_id = %client.client_id, "Registered OAuth client");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "client_id": client.client_id,
            "client_secret": client.client_secret,
            "client_id_issued_at": client.created_at,
            "client_secret_expires_at": 0,
            "redirect_uris": client.redirect_uris,
            "client_name": client.client_name,
            "token_endpoint_auth_method": "client_secret_post"
        })),
    )
        .into_response()
}

// ─── Discovery ────────────────────────────────────────────────────────────────

/// `GET /.well-known/oauth-authorization-server`
///
/// Endpoint URLs are derived from the inbound request's host and scheme
/// (respecting `x-forwarded-proto` behind a TLS-terminating proxy), never
/// hardcoded.
pub async fn handle_discovery(headers: HeaderMap) -> impl IntoResponse {
    let base_url = request_base_url(&headers);

    Json(serde_json::json!({
        "issuer": base_url,
        "authorization_endpoint": format!("{base_url}/oauth/authorize"),
        "token_endpoint": format!("{base_url}/oauth/token"),
        "registration_endpoint": format!("{base_url}/oauth/register"),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code"],
        "token_endpoint_auth_methods_supported": ["client_secret_post", "client_secret_basic"]
    }))
}

/// Structured OAuth error body.
fn oauth_error(status: StatusCode, error: &str, description: Option<&str>) -> Response {
    let mut body = serde_json::json!({ "error": error });
    if let Some(description) = description {
        body["error_description"] = serde_json::Value::String(description.to_string());
    }
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_credentials_parsing() {
        let mut headers = HeaderMap::new();
        let encoded = base64::engine::general_purpose::STANDARD.encode("myclient:mysecret");
        headers.insert(header::AUTHORIZATION, format!("Basic {encoded}").parse().unwrap());

        let (id, secret) = basic_credentials(&headers).unwrap().unwrap();
        assert_eq!(id, "myclient");
        assert_eq!(secret, "mysecret");
    }

    #[test]
    fn test_basic_credentials_absent() {
        assert_eq!(basic_credentials(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn test_basic_credentials_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic !!!not-base64!!!".parse().unwrap());
        assert!(basic_credentials(&headers).is_err());
    }
}
