//! Sessions API.

use crate::client::OpenTokClient;
use crate::error::Result;
use crate::operation::Operation;
use crate::params::SessionParams;

/// Sessions API client.
pub struct SessionsApi {
    client: OpenTokClient,
}

impl SessionsApi {
    pub(crate) fn new(client: OpenTokClient) -> Self {
        Self { client }
    }

    /// Create a new session.
    ///
    /// Returns the raw response payload. Unsuccessful statuses are not
    /// classified; their payload is returned as well.
    pub async fn create(&self, params: Option<&SessionParams>) -> Result<String> {
        let encoding = self.client.inner().form_encoding;
        self.client
            .dispatch(Operation::create_session(params, encoding))
            .await
    }
}
