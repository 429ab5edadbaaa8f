//! Authentication: credential resolution, token issuance, OAuth state.

pub mod resolver;
pub mod store;
pub mod token;

pub use resolver::{resolve_credential, Credential, CredentialSource};
pub use store::{CodeError, OAuthStore};
pub use token::TokenIssuer;
