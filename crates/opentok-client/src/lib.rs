//! Async client for the OpenTok REST API.
//!
//! Covers session creation and the archive lifecycle. Each request is
//! authenticated with a fresh token, and every failure is reported as a
//! typed [`Error`] naming the operation, the status and the identifiers
//! involved. Successful payloads are returned verbatim.
//!
//! # Example
//!
//! ```no_run
//! use opentok_client::{ArchiveProperties, OpenTokClient, OutputMode, Result, SessionParams};
//!
//! # async fn example() -> Result<()> {
//! let client = OpenTokClient::builder(123456, "secret").build()?;
//!
//! // Create a session
//! let mut params = SessionParams::new();
//! params.insert("p2p.preference".to_string(), vec!["disabled".to_string()]);
//! let session = client.sessions().create(Some(&params)).await?;
//! println!("Session: {}", session);
//!
//! // Record it
//! let properties = ArchiveProperties::default().output_mode(OutputMode::Individual);
//! match client.archives().start("session-id", &properties).await {
//!     Ok(archive) => println!("Archive: {}", archive),
//!     Err(e) if e.status() == Some(409) => println!("Already recording"),
//!     Err(e) => return Err(e),
//! }
//!
//! client.close();
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Sessions**: create
//! - **Archives**: get, list (paged or by session), start, stop, delete
//!
//! No retries or timeouts are applied; callers own that policy.

pub mod api;
pub mod client;
pub mod error;
pub mod operation;
pub mod params;
pub mod types;

pub use client::{AUTH_HEADER, ClientBuilder, DEFAULT_API_URL, OpenTokClient, TransportOptions};
pub use error::{Error, Result};
pub use operation::{Condition, OperationKind};
pub use params::{FormEncoding, Param, SessionParams, build_body, to_param_sequence};
pub use types::*;

pub use opentok_auth::{JwtTokenGenerator, TokenError, TokenGenerator};
