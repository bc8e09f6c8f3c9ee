//! Authentication tokens for the OpenTok REST API.
//!
//! Every REST request carries a short-lived token in the `X-OPENTOK-AUTH`
//! header. Tokens are derived from the project's API key and secret.
//!
//! # Components
//!
//! - [`token`] — the [`TokenGenerator`] seam and the JWT-backed default
//! - [`error`] — token generation failures

pub mod error;
pub mod token;

pub use error::{Result, TokenError};
pub use token::{DEFAULT_TOKEN_TTL, JwtTokenGenerator, TokenClaims, TokenGenerator};
