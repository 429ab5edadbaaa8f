//! Per-request credential resolution.
//!
//! Pure function of the request headers plus token verification state: no
//! side effects, no storage access. The resolved credential lives only for
//! the duration of the request that carried it.

use axum::http::HeaderMap;

use crate::config::is_api_key;

use super::token::TokenIssuer;

/// Where a resolved credential came from.
///
/// The dispatcher uses this to word its remediation message when a later
/// request arrives with no credential at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `x-api-key` header, used verbatim.
    Header,
    /// API key extracted from a verified access token.
    OAuth,
    /// Raw API key presented directly as a bearer token.
    Bearer,
    /// Process-wide default from the environment.
    Default,
}

/// An upstream API key resolved for one request.
#[derive(Debug, Clone)]
pub struct Credential {
    /// The upstream API key.
    pub api_key: String,
    /// How the key was presented.
    pub source: CredentialSource,
}

impl Credential {
    /// Wrap the process-wide default key.
    #[must_use]
    pub fn default_key(api_key: String) -> Self {
        Self { api_key, source: CredentialSource::Default }
    }
}

/// Resolve the upstream credential for a request, first match wins:
///
/// 1. `x-api-key` header, verbatim.
/// 2. `Authorization: Bearer <t>` where `t` verifies as an access token
///    (extracts the embedded key), or `t` itself looks like an API key.
/// 3. The configured default key.
#[must_use]
pub fn resolve_credential(
    headers: &HeaderMap,
    issuer: &TokenIssuer,
    default_api_key: Option<&str>,
) -> Option<Credential> {
    if let Some(key) = header_str(headers, "x-api-key") {
        return Some(Credential { api_key: key.to_string(), source: CredentialSource::Header });
    }

    if let Some(token) = bearer_token(headers) {
        if let Some(api_key) = issuer.verify(token) {
            tracing::debug!("Resolved API key from verified bearer token");
            return Some(Credential { api_key, source: CredentialSource::OAuth });
        }
        if is_api_key(token) {
            tracing::debug!("Resolved raw API key from Authorization header");
            return Some(Credential {
                api_key: token.to_string(),
                source: CredentialSource::Bearer,
            });
        }
    }

    default_api_key.map(|key| Credential::default_key(key.to_string()))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, "authorization")?.strip_prefix("Bearer ")
}
