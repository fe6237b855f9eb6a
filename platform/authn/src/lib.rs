//! Platform authentication helpers.
//!
//! The record store performs no authentication of its own, so "being signed in"
//! means holding a decodable session token in client storage. The token is minted
//! here, carries no signature and is never verified by anyone else. Treat it as an
//! indicator for routing, not as a security control.

pub mod guard;
pub mod service;
pub mod session;
pub mod token;

use platform_api::ApiError;
use platform_storage::StorageError;
use thiserror::Error;

pub use guard::{Access, Guard, View};
pub use service::{AuthService, Credentials, LoginOutcome};
pub use session::Session;
pub use token::{SessionIdentity, TOKEN_KEY, TokenError};

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("User already exists")]
    DuplicateUser,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type AuthnResult<T> = Result<T, AuthnError>;
