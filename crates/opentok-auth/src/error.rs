//! Error types for token generation.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, TokenError>;

/// Errors that can occur while generating an authentication token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The API key is not a valid project key.
    #[error("Invalid API key: {0}")]
    InvalidApiKey(u32),

    /// The API secret is empty.
    #[error("Invalid API secret: the secret must not be empty")]
    InvalidSecret,

    /// The token could not be signed.
    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
