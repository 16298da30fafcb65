use super::synthesis_provider::ProviderError;
use crate::domain::upload::UploadMetadata;
use async_trait::async_trait;
use std::path::Path;

/// Handle returned by the host when a resumable session is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSessionHandle {
    pub session_token: String,
    pub upload_endpoint: String,
}

/// Host acknowledgment of a chunk (or of a zero-length status query).
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkAck {
    /// Total bytes the host reports as received, authoritative
    pub accepted_offset: u64,
    /// Present once the host has finalized the resource
    pub resource_id: Option<String>,
}

/// Capability interface for a chunked, resumable upload host.
#[async_trait]
pub trait UploadProvider: Send + Sync {
    async fn create_session(
        &self,
        metadata: &UploadMetadata,
        file_size: u64,
    ) -> Result<UploadSessionHandle, ProviderError>;

    /// Send `bytes` starting at `offset` of a file of `total_size` bytes.
    /// An empty `bytes` asks the host for its current state.
    async fn send_chunk(
        &self,
        session: &UploadSessionHandle,
        offset: u64,
        bytes: &[u8],
        total_size: u64,
    ) -> Result<ChunkAck, ProviderError>;

    /// Attach a secondary artifact (cover image) to an uploaded resource
    async fn attach_artifact(&self, resource_id: &str, artifact: &Path) -> Result<(), ProviderError>;
}
