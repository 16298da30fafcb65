use super::synthesis_provider::{ProviderError, SynthesisProvider, SynthesisRequest};
use crate::domain::assembly::{AudioContainer, TargetFormat};
use crate::infrastructure::audio::conform_wav;
use async_trait::async_trait;
use std::sync::Arc;

/// Ordered list of synthesis providers tried in sequence until one succeeds.
///
/// The chain makes one attempt per provider. If every provider fails, the
/// returned error is retryable when any provider failed transiently, so the
/// caller's retry policy re-runs the whole chain; it is fatal only when every
/// provider failed permanently.
///
/// With a target format set, WAV output from whichever provider answered is
/// rewritten to the target rate and channel count, so a track that fell back
/// mid-way still has segments of one layout.
pub struct ProviderChain {
    providers: Vec<Arc<dyn SynthesisProvider>>,
    name: String,
    target: Option<TargetFormat>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn SynthesisProvider>>) -> Self {
        let name = providers
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(">");

        Self {
            providers,
            name,
            target: None,
        }
    }

    pub fn with_target(mut self, target: TargetFormat) -> Self {
        self.target = Some(target);
        self
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn conform(&self, audio: Vec<u8>) -> Result<Vec<u8>, ProviderError> {
        match self.target {
            Some(target) if target.container == AudioContainer::Wav => {
                conform_wav(&audio, target.sample_rate, target.channels)
                    .map_err(|e| ProviderError::fatal(format!("Unreadable WAV output: {}", e)))
            }
            _ => Ok(audio),
        }
    }
}

#[async_trait]
impl SynthesisProvider for ProviderChain {
    fn name(&self) -> &str {
        &self.name
    }

    /// Segments of one track share a container: the target's when set, else the primary's.
    fn audio_extension(&self) -> &str {
        match self.target {
            Some(target) => target.container.extension(),
            None => self
                .providers
                .first()
                .map(|p| p.audio_extension())
                .unwrap_or("wav"),
        }
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        if self.providers.is_empty() {
            return Err(ProviderError::fatal("No synthesis providers configured"));
        }

        let mut all_errors: Vec<(String, ProviderError)> = Vec::new();

        for provider in &self.providers {
            tracing::debug!(provider = provider.name(), "Attempting synthesis provider");

            match provider
                .synthesize(request)
                .await
                .and_then(|audio| self.conform(audio))
            {
                Ok(audio) => {
                    if !all_errors.is_empty() {
                        tracing::info!(
                            provider = provider.name(),
                            failed_before = all_errors.len(),
                            "Fallback provider succeeded"
                        );
                    }
                    return Ok(audio);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "Synthesis provider failed, trying next"
                    );
                    all_errors.push((provider.name().to_string(), e));
                }
            }
        }

        let summary = all_errors
            .iter()
            .map(|(name, e)| format!("{}: {}", name, e))
            .collect::<Vec<_>>()
            .join("; ");
        let any_retryable = all_errors
            .iter()
            .any(|(_, e)| matches!(e, ProviderError::Retryable { .. }));

        tracing::error!(errors = %summary, "All synthesis providers failed");

        if any_retryable {
            Err(ProviderError::retryable(format!(
                "All providers failed: {}",
                summary
            )))
        } else {
            Err(ProviderError::fatal(format!(
                "All providers failed: {}",
                summary
            )))
        }
    }
}
