//! Signed-token capability surrounding the user routes.
//!
//! No user operation gates on it; it is the access-control primitive handed
//! to whoever builds the HTTP surface.

mod jwt;

pub use jwt::{Claims, JwtAuthService, TOKEN_TTL_SECS};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Issues a credential embedding a subject id and recovers it on verification.
pub trait AuthService: Send + Sync {
    fn issue(&self, subject: i64) -> Result<String, TokenError>;
    fn verify(&self, token: &str) -> Result<i64, TokenError>;
}
