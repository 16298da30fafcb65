use super::error::UploadError;
use super::model::{UploadMetadata, UploadOutcome};
use super::session::{FailureDecision, UploadSession};
use crate::domain::shared::retry::RetryPolicy;
use crate::infrastructure::providers::{ProviderError, UploadProvider};
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pushes a media file to an upload host in fixed-size chunks, resuming after transient failures.
pub struct ResumableUploader {
    provider: Arc<dyn UploadProvider>,
    chunk_size: usize,
    max_retries: u32,
    retry_policy: RetryPolicy,
}

impl ResumableUploader {
    /// `max_retries` counts consecutive retries per stalled offset
    pub fn new(
        provider: Arc<dyn UploadProvider>,
        chunk_size: usize,
        max_retries: u32,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            provider,
            chunk_size: chunk_size.max(1),
            max_retries,
            retry_policy: RetryPolicy::new(max_retries + 1, base_delay, max_delay),
        }
    }

    pub fn with_defaults(provider: Arc<dyn UploadProvider>) -> Self {
        Self::new(
            provider,
            DEFAULT_CHUNK_SIZE,
            DEFAULT_MAX_RETRIES,
            Duration::from_secs(1),
            Duration::from_secs(8),
        )
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Upload `file_path` and, if given, attach `cover_image` to the created resource.
    ///
    /// A cover that cannot be attached is reported in `warnings`; it never fails the upload.
    pub async fn upload(
        &self,
        file_path: &Path,
        metadata: &UploadMetadata,
        cover_image: Option<&Path>,
    ) -> Result<UploadOutcome, UploadError> {
        let file_error = |source| UploadError::File {
            path: file_path.to_path_buf(),
            source,
        };

        let file_size = tokio::fs::metadata(file_path).await.map_err(file_error)?.len();
        if file_size == 0 {
            return Err(UploadError::EmptyFile(file_path.to_path_buf()));
        }

        tracing::info!(
            file = %file_path.display(),
            file_size = file_size,
            chunk_size = self.chunk_size,
            title = %metadata.title,
            "Starting resumable upload"
        );

        let handle = self
            .retry_policy
            .run(|_| self.provider.create_session(metadata, file_size))
            .await
            .map_err(UploadError::Session)?;

        let mut session = UploadSession::new(handle, file_size, self.chunk_size, self.max_retries);
        let mut file = tokio::fs::File::open(file_path).await.map_err(file_error)?;
        let mut buffer = vec![0u8; self.chunk_size.min(file_size as usize)];
        let mut chunks_acknowledged = 0usize;

        while !session.is_complete() {
            let offset = session.next_offset();
            let len = session.next_chunk_len();

            if len > 0 {
                file.seek(SeekFrom::Start(offset)).await.map_err(file_error)?;
                file.read_exact(&mut buffer[..len]).await.map_err(file_error)?;
            }

            let failure = match self
                .provider
                .send_chunk(&session.handle(), offset, &buffer[..len], file_size)
                .await
            {
                Ok(ack) => {
                    if session.acknowledge(&ack)? {
                        chunks_acknowledged += 1;
                        tracing::debug!(
                            offset = offset,
                            accepted_offset = session.next_offset(),
                            file_size = file_size,
                            "Chunk acknowledged"
                        );
                        continue;
                    }
                    if session.is_complete() {
                        continue;
                    }
                    // Nothing new stored, or all bytes stored but no id yet
                    ProviderError::retryable(format!(
                        "host made no progress at offset {}",
                        offset
                    ))
                }
                Err(e) => e,
            };

            match session.record_failure(&failure) {
                FailureDecision::Retry => {
                    tracing::warn!(
                        offset = offset,
                        retry_count = session.retry_count(),
                        max_retries = self.max_retries,
                        error = %failure,
                        "Upload paused, retrying from last acknowledged offset"
                    );
                    self.retry_policy
                        .wait_before_retry(session.retry_count(), &failure)
                        .await;
                    session.resume();
                }
                FailureDecision::Abort => {
                    tracing::error!(offset = offset, error = %failure, "Upload rejected");
                    return Err(UploadError::Rejected {
                        offset,
                        source: failure,
                    });
                }
                FailureDecision::Exhausted => {
                    tracing::error!(
                        offset = offset,
                        failures = session.retry_count(),
                        error = %failure,
                        "Upload retry ceiling reached"
                    );
                    return Err(UploadError::RetriesExhausted {
                        offset,
                        failures: session.retry_count(),
                        source: failure,
                    });
                }
            }
        }

        let resource_id = session.resource_id().unwrap_or_default().to_string();

        tracing::info!(
            resource_id = %resource_id,
            bytes_sent = file_size,
            chunks = chunks_acknowledged,
            "Upload completed"
        );

        let mut warnings = Vec::new();
        if let Some(cover) = cover_image {
            if let Err(e) = self.attach_cover(&resource_id, cover).await {
                tracing::warn!(
                    resource_id = %resource_id,
                    cover = %cover.display(),
                    error = %e,
                    "Cover image could not be attached"
                );
                warnings.push(format!("cover image not attached: {}", e));
            }
        }

        Ok(UploadOutcome {
            resource_id,
            bytes_sent: file_size,
            chunks_acknowledged,
            warnings,
        })
    }

    async fn attach_cover(&self, resource_id: &str, cover: &Path) -> Result<(), ProviderError> {
        self.retry_policy
            .run(|_| self.provider.attach_artifact(resource_id, cover))
            .await
    }
}
