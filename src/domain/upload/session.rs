use super::error::UploadError;
use crate::domain::shared::retry::Retryable;
use crate::infrastructure::providers::{ChunkAck, ProviderError, UploadSessionHandle};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Initiated,
    Uploading,
    PausedOnRetry,
    Failed,
    Completed,
}

/// What the uploader should do after a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDecision {
    Retry,
    /// Permanent error; the session is failed
    Abort,
    /// Too many consecutive failures; the session is failed
    Exhausted,
}

/// State of one resumable upload.
///
/// `next_offset` never decreases and equals `file_size` only once the host has
/// acknowledged every byte. The session is `Completed` only when, in addition,
/// the host has returned a resource id.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSession {
    file_size: u64,
    chunk_size: usize,
    next_offset: u64,
    session_token: String,
    upload_endpoint: String,
    retry_count: u32,
    max_retries: u32,
    status: UploadStatus,
    resource_id: Option<String>,
}

impl UploadSession {
    pub fn new(
        handle: UploadSessionHandle,
        file_size: u64,
        chunk_size: usize,
        max_retries: u32,
    ) -> Self {
        Self {
            file_size,
            chunk_size: chunk_size.max(1),
            next_offset: 0,
            session_token: handle.session_token,
            upload_endpoint: handle.upload_endpoint,
            retry_count: 0,
            max_retries,
            status: UploadStatus::Initiated,
            resource_id: None,
        }
    }

    pub fn handle(&self) -> UploadSessionHandle {
        UploadSessionHandle {
            session_token: self.session_token.clone(),
            upload_endpoint: self.upload_endpoint.clone(),
        }
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.status == UploadStatus::Completed
    }

    /// Bytes of the next chunk; zero once everything is acknowledged (status query).
    pub fn next_chunk_len(&self) -> usize {
        let remaining = self.file_size - self.next_offset;
        remaining.min(self.chunk_size as u64) as usize
    }

    /// Apply a host acknowledgment. Returns whether the offset advanced.
    pub fn acknowledge(&mut self, ack: &ChunkAck) -> Result<bool, UploadError> {
        if ack.accepted_offset < self.next_offset || ack.accepted_offset > self.file_size {
            self.status = UploadStatus::Failed;
            return Err(UploadError::ProtocolViolation {
                current: self.next_offset,
                reported: ack.accepted_offset,
                file_size: self.file_size,
            });
        }

        let progressed = ack.accepted_offset > self.next_offset;
        self.next_offset = ack.accepted_offset;

        if let Some(id) = &ack.resource_id {
            self.resource_id = Some(id.clone());
        }

        if progressed {
            self.retry_count = 0;
        }

        self.status = if self.next_offset == self.file_size && self.resource_id.is_some() {
            UploadStatus::Completed
        } else {
            UploadStatus::Uploading
        };

        Ok(progressed)
    }

    /// Record a failed call (or an acknowledgment that made no progress).
    pub fn record_failure(&mut self, error: &ProviderError) -> FailureDecision {
        if !error.is_retryable() {
            self.status = UploadStatus::Failed;
            return FailureDecision::Abort;
        }

        self.retry_count += 1;
        if self.retry_count > self.max_retries {
            self.status = UploadStatus::Failed;
            return FailureDecision::Exhausted;
        }

        self.status = UploadStatus::PausedOnRetry;
        FailureDecision::Retry
    }

    /// Leave `PausedOnRetry` after the backoff elapsed
    pub fn resume(&mut self) {
        if self.status == UploadStatus::PausedOnRetry {
            self.status = UploadStatus::Uploading;
        }
    }
}
