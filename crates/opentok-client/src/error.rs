//! Client error types.

use opentok_auth::TokenError;
use thiserror::Error;

use crate::operation::{Condition, OperationKind};

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No authentication token could be generated. Nothing was sent.
    #[error("Could not {operation}. Authentication failed: {source}")]
    Auth {
        operation: OperationKind,
        #[source]
        source: TokenError,
    },

    /// The request body could not be serialized. Nothing was sent.
    #[error("Could not {operation}. The JSON body encoding failed.")]
    Encoding {
        operation: OperationKind,
        #[source]
        source: serde_json::Error,
    },

    /// An identifier cannot be used as a URL path segment. Nothing was sent.
    #[error("Could not {operation}. Invalid identifier: {id:?}")]
    InvalidIdentifier { operation: OperationKind, id: String },

    /// The request failed before a status code was received.
    #[error("Could not {operation}. The request could not be completed.")]
    Transport {
        operation: OperationKind,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a known failure status.
    #[error("{message}")]
    Protocol {
        operation: OperationKind,
        /// HTTP status code.
        status: u16,
        condition: Condition,
        archive_id: Option<String>,
        session_id: Option<String>,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The server answered with a status this operation does not expect.
    #[error("Could not {operation}. The server response was invalid. response code: {status}")]
    UnexpectedStatus {
        operation: OperationKind,
        /// HTTP status code.
        status: u16,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The client was closed.
    #[error("Client is closed")]
    Closed,
}

impl Error {
    /// Operation that failed, if the error came from a dispatched request.
    pub fn operation(&self) -> Option<OperationKind> {
        match self {
            Error::Auth { operation, .. }
            | Error::Encoding { operation, .. }
            | Error::InvalidIdentifier { operation, .. }
            | Error::Transport { operation, .. }
            | Error::Protocol { operation, .. }
            | Error::UnexpectedStatus { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// HTTP status code, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol { status, .. } | Error::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Classified server condition.
    pub fn condition(&self) -> Option<Condition> {
        match self {
            Error::Protocol { condition, .. } => Some(*condition),
            _ => None,
        }
    }

    /// Archive named by the error.
    pub fn archive_id(&self) -> Option<&str> {
        match self {
            Error::Protocol { archive_id, .. } => archive_id.as_deref(),
            _ => None,
        }
    }

    /// Session named by the error.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Error::Protocol { session_id, .. } => session_id.as_deref(),
            _ => None,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth { .. })
            || matches!(
                self,
                Error::Protocol {
                    condition: Condition::Unauthorized,
                    ..
                }
            )
    }

    /// Check if the request never received a status code.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
