//! Archives API.

use crate::client::OpenTokClient;
use crate::error::Result;
use crate::operation::Operation;
use crate::types::{ArchiveListQuery, ArchiveProperties};

/// Archives API client.
///
/// Every method returns the raw response payload on success.
pub struct ArchivesApi {
    client: OpenTokClient,
}

impl ArchivesApi {
    pub(crate) fn new(client: OpenTokClient) -> Self {
        Self { client }
    }

    fn api_key(&self) -> u32 {
        self.client.inner().api_key
    }

    /// Get an archive by ID.
    pub async fn get(&self, archive_id: &str) -> Result<String> {
        self.client
            .dispatch(Operation::get_archive(self.api_key(), archive_id))
            .await
    }

    /// List archives.
    pub async fn list(&self, query: &ArchiveListQuery) -> Result<String> {
        self.client
            .dispatch(Operation::list_archives(self.api_key(), query))
            .await
    }

    /// List a page of archives.
    pub async fn list_paged(&self, offset: u32, count: u32) -> Result<String> {
        self.list(&ArchiveListQuery::Paged { offset, count }).await
    }

    /// List the archives of a session.
    pub async fn list_for_session(&self, session_id: &str) -> Result<String> {
        self.list(&ArchiveListQuery::BySession(session_id.to_string()))
            .await
    }

    /// Start recording a session.
    pub async fn start(&self, session_id: &str, properties: &ArchiveProperties) -> Result<String> {
        let operation = Operation::start_archive(self.api_key(), session_id, properties)?;
        self.client.dispatch(operation).await
    }

    /// Stop a recording archive.
    pub async fn stop(&self, archive_id: &str) -> Result<String> {
        self.client
            .dispatch(Operation::stop_archive(self.api_key(), archive_id))
            .await
    }

    /// Delete an archive.
    pub async fn delete(&self, archive_id: &str) -> Result<String> {
        self.client
            .dispatch(Operation::delete_archive(self.api_key(), archive_id))
            .await
    }
}
