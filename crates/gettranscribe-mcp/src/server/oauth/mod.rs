//! Embedded OAuth 2.0 authorization server.
//!
//! Connector clients that cannot be configured with an API key directly go
//! through a standard authorization-code flow instead: the user pastes their
//! GetTranscribe key into the authorization page, and the resulting access
//! token carries that key in its claims. Verifying the token at request time
//! recovers the key, so the upstream API never learns about OAuth at all.

pub mod handlers;
pub mod login;

pub use handlers::{
    handle_authorize_get, handle_authorize_post, handle_discovery, handle_register, handle_token,
};
