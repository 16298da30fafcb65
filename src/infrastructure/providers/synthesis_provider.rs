use crate::domain::narration::LanguageCode;
use crate::domain::shared::retry::Retryable;
use async_trait::async_trait;
use std::time::Duration;

/// Error returned by an external provider (synthesis or upload host),
/// already classified as transient or permanent.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("transient provider failure: {message}")]
    Retryable {
        message: String,
        retry_after: Option<Duration>,
    },
    #[error("fatal provider failure: {0}")]
    Fatal(String),
}

impl ProviderError {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self::Retryable {
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Classify an HTTP status: timeouts, rate limits and 5xx are transient,
    /// everything else (auth, not found, malformed request) is permanent.
    pub fn from_status(status: u16, message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let message = format!("HTTP {}: {}", status, message.into());
        match status {
            408 | 425 | 429 | 500..=599 => Self::Retryable {
                message,
                retry_after,
            },
            _ => Self::Fatal(message),
        }
    }

    /// Classify a transport-level reqwest error (no HTTP status received, or a status error).
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return Self::from_status(status.as_u16(), error.to_string(), None);
        }
        if error.is_timeout() || error.is_connect() || error.is_request() || error.is_body() {
            return Self::retryable(error.to_string());
        }
        Self::fatal(error.to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Retryable { message, .. } => message,
            Self::Fatal(message) => message,
        }
    }
}

impl Retryable for ProviderError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Retryable { retry_after, .. } => *retry_after,
            Self::Fatal(_) => None,
        }
    }
}

/// One synthesis call: a single segment of text.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    /// Empty means "provider default for the language"
    pub voice: String,
    pub language: LanguageCode,
    pub model: Option<String>,
}

/// Capability interface for text-to-speech providers.
///
/// Implementations are responsible for:
/// - Calling the provider with exactly the text given (no splitting, the caller segments)
/// - Returning audio bytes in the container the provider was configured for
/// - Classifying every failure as retryable or fatal
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Short identifier used in logs and readiness output
    fn name(&self) -> &str;

    /// File extension of the audio this provider returns
    fn audio_extension(&self) -> &str;

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ProviderError>;
}
