//! Common test utilities for integration tests.

#![allow(dead_code)]

use opentok_client::{OpenTokClient, TokenError, TokenGenerator, TransportOptions};
use wiremock::MockServer;

pub const API_KEY: u32 = 123456;
pub const API_SECRET: &str = "test-secret";
pub const TOKEN: &str = "test-token";

/// Install a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Always hands out the same token.
#[derive(Debug)]
pub struct FixedTokenGenerator;

impl TokenGenerator for FixedTokenGenerator {
    fn generate(&self, _api_key: u32, _api_secret: &str) -> Result<String, TokenError> {
        Ok(TOKEN.to_string())
    }
}

/// Never produces a token.
#[derive(Debug)]
pub struct FailingTokenGenerator;

impl TokenGenerator for FailingTokenGenerator {
    fn generate(&self, _api_key: u32, _api_secret: &str) -> Result<String, TokenError> {
        Err(TokenError::InvalidSecret)
    }
}

/// Default transport settings, ignoring proxy settings from the environment.
pub fn transport_options() -> TransportOptions {
    TransportOptions {
        no_proxy: true,
        ..Default::default()
    }
}

/// Client pointed at a mock server with a fixed token.
pub fn client_for(server: &MockServer) -> OpenTokClient {
    init_tracing();
    OpenTokClient::builder(API_KEY, API_SECRET)
        .api_url(server.uri())
        .transport_options(transport_options())
        .token_generator(FixedTokenGenerator)
        .build()
        .unwrap()
}

/// Path of the project's archive collection.
pub fn archive_path() -> String {
    format!("/v2/project/{}/archive", API_KEY)
}
