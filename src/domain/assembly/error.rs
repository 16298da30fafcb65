use crate::infrastructure::audio::ConcatError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("no segments to assemble")]
    NoSegments,
    #[error("segment {index} missing at {}", .path.display())]
    MissingSegment { index: usize, path: PathBuf },
    #[error("segment {index} at {} is empty", .path.display())]
    EmptySegment { index: usize, path: PathBuf },
    #[error("no concat backend can produce the target format from these segments")]
    NoBackend,
    #[error("{backend} backend failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source: ConcatError,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
