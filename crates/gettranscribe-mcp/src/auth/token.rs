//! Signed access tokens embedding an upstream API key.
//!
//! Tokens are self-contained HS256 JWTs: validity is purely a function of
//! signature and declared expiry, so verification never touches storage or
//! the network.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::api::ACCESS_TOKEN_LIFETIME;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The upstream GetTranscribe API key this token stands in for.
    pub api_key: String,
    /// Issued-at (Unix seconds).
    pub iat: u64,
    /// Expiry (Unix seconds), 24 hours after issuance.
    pub exp: u64,
}

/// Mints and verifies signed access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    /// Create an issuer from the signing secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue an access token embedding the given API key.
    ///
    /// # Errors
    ///
    /// Returns error if signing fails.
    pub fn issue(&self, api_key: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp().unsigned_abs();
        let claims = TokenClaims {
            api_key: api_key.to_string(),
            iat: now,
            exp: now + ACCESS_TOKEN_LIFETIME,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Verify a token and extract the embedded API key.
    ///
    /// Returns `None` on any signature or expiry failure. Verification is
    /// purely computational and never blocks.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<String> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims.api_key)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish()
    }
}

/// Generate an opaque authorization code.
#[must_use]
pub fn generate_auth_code() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_verify_roundtrip() {
        let issuer = TokenIssuer::new("test-secret");
        let token = issuer.issue("gtr_mykey").unwrap();
        assert_eq!(issuer.verify(&token).as_deref(), Some("gtr_mykey"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenIssuer::new("test-secret");
        let other = TokenIssuer::new("other-secret");
        let token = issuer.issue("gtr_mykey").unwrap();
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new("test-secret");
        assert!(issuer.verify("not-a-token").is_none());
        assert!(issuer.verify("").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new("test-secret");

        // Sign an already-expired set of claims with the same key.
        let now = chrono::Utc::now().timestamp().unsigned_abs();
        let claims = TokenClaims {
            api_key: "gtr_mykey".to_string(),
            iat: now - ACCESS_TOKEN_LIFETIME - 120,
            exp: now - 120,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(issuer.verify(&token).is_none());
    }

    #[test]
    fn test_auth_codes_are_unique() {
        assert_ne!(generate_auth_code(), generate_auth_code());
    }
}
