use crate::infrastructure::providers::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("segment {index} failed after {attempts} attempt(s): {source}")]
    Provider {
        index: usize,
        attempts: u32,
        #[source]
        source: ProviderError,
    },
    #[error("segment {index} could not be written: {source}")]
    Io {
        index: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("working directory unavailable: {0}")]
    WorkDir(std::io::Error),
}

impl SynthesisError {
    /// Segment the failure belongs to, if any
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            SynthesisError::Provider { index, .. } | SynthesisError::Io { index, .. } => {
                Some(*index)
            }
            SynthesisError::WorkDir(_) => None,
        }
    }

    /// True when the provider rejected the request permanently
    pub fn is_fatal_provider_error(&self) -> bool {
        matches!(
            self,
            SynthesisError::Provider {
                source: ProviderError::Fatal(_),
                ..
            }
        )
    }
}
