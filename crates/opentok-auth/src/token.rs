//! Token generation.
//!
//! The client asks a [`TokenGenerator`] for a fresh token before every
//! request. [`JwtTokenGenerator`] is the production implementation; tests
//! inject their own to force failures or pin token values.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenError};

/// Lifetime of a generated token (3 minutes).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(180);

/// Issuer type claim for project-level tokens.
const ISSUER_TYPE: &str = "project";

// ============================================================================
// TokenGenerator Trait
// ============================================================================

/// Produces an opaque, time-bound authentication token.
pub trait TokenGenerator: Send + Sync + std::fmt::Debug {
    /// Generate a token for the given project credentials.
    fn generate(&self, api_key: u32, api_secret: &str) -> Result<String>;
}

// ============================================================================
// JwtTokenGenerator
// ============================================================================

/// Claims carried by a project token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer: the API key.
    pub iss: String,
    /// Issuer type, always `"project"`.
    pub ist: String,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

/// HS256 JWT token generator signed with the API secret.
#[derive(Debug, Clone)]
pub struct JwtTokenGenerator {
    ttl: Duration,
}

impl JwtTokenGenerator {
    /// Create a generator with the default token lifetime.
    pub fn new() -> Self {
        Self {
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Create a generator with a custom token lifetime.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn claims(&self, api_key: u32) -> TokenClaims {
        let iat = Utc::now().timestamp();
        TokenClaims {
            iss: api_key.to_string(),
            ist: ISSUER_TYPE.to_string(),
            iat,
            exp: iat + self.ttl.as_secs() as i64,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl Default for JwtTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator for JwtTokenGenerator {
    fn generate(&self, api_key: u32, api_secret: &str) -> Result<String> {
        if api_key == 0 {
            return Err(TokenError::InvalidApiKey(api_key));
        }
        if api_secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &self.claims(api_key),
            &EncodingKey::from_secret(api_secret.as_bytes()),
        )?;
        Ok(token)
    }
}
