use crate::domain::assembly::TargetFormat;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConcatError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),
    #[error("external process failed: {0}")]
    Process(String),
    #[error("inputs not supported: {0}")]
    Unsupported(String),
}

/// A way of joining ordered audio files into one continuous file.
#[async_trait]
pub trait ConcatBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this backend can join `inputs` into a file of format `target`
    async fn supports(&self, inputs: &[PathBuf], target: &TargetFormat) -> bool;

    /// Join `inputs` in order into `output`, returning the duration of the written file
    async fn concat(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        target: &TargetFormat,
    ) -> Result<Duration, ConcatError>;
}
