use crate::infrastructure::providers::ProviderError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("cannot read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is empty", .0.display())]
    EmptyFile(PathBuf),
    #[error("upload session could not be created: {0}")]
    Session(#[source] ProviderError),
    #[error("chunk at offset {offset} rejected: {source}")]
    Rejected {
        offset: u64,
        #[source]
        source: ProviderError,
    },
    #[error("gave up at offset {offset} after {failures} consecutive failures: {source}")]
    RetriesExhausted {
        offset: u64,
        failures: u32,
        #[source]
        source: ProviderError,
    },
    #[error("host reported offset {reported}, expected between {current} and {file_size}")]
    ProtocolViolation {
        current: u64,
        reported: u64,
        file_size: u64,
    },
}

impl UploadError {
    /// Byte offset the failure happened at, when it concerns a chunk
    pub fn offset(&self) -> Option<u64> {
        match self {
            UploadError::Rejected { offset, .. } | UploadError::RetriesExhausted { offset, .. } => {
                Some(*offset)
            }
            UploadError::ProtocolViolation { current, .. } => Some(*current),
            _ => None,
        }
    }
}
