//! API endpoint implementations.

mod archives;
mod sessions;

pub use archives::ArchivesApi;
pub use sessions::SessionsApi;
