use super::error::SynthesisError;
use super::job::SynthesisJob;
use crate::domain::narration::{LanguageCode, Segment};
use crate::domain::shared::retry::RetryPolicy;
use crate::infrastructure::providers::{SynthesisProvider, SynthesisRequest};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    /// Jobs in segment index order
    pub jobs: Vec<SynthesisJob>,
}

impl SynthesisOutcome {
    /// Audio files in segment index order, ready for assembly
    pub fn audio_paths(&self) -> Vec<PathBuf> {
        self.jobs.iter().map(|j| j.audio_path.clone()).collect()
    }

    pub fn resumed_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.resumed).count()
    }
}

/// Drives one synthesis job per segment with bounded retry and bounded parallelism.
pub struct SynthesisOrchestrator {
    provider: Arc<dyn SynthesisProvider>,
    retry_policy: RetryPolicy,
    concurrency: usize,
    model: Option<String>,
}

impl SynthesisOrchestrator {
    pub fn new(
        provider: Arc<dyn SynthesisProvider>,
        retry_policy: RetryPolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            provider,
            retry_policy,
            concurrency: concurrency.max(1),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Deterministic location of a segment's audio.
    pub fn segment_path(work_dir: &Path, index: usize, extension: &str) -> PathBuf {
        work_dir.join(format!("segment_{:04}.{}", index, extension))
    }

    /// Synthesize every segment into `work_dir`.
    ///
    /// Segments whose audio already exists are skipped. The first fatal error stops
    /// dispatching; files already written stay on disk so a later run can resume.
    pub async fn synthesize_all(
        &self,
        segments: &[Segment],
        voice: &str,
        language: LanguageCode,
        work_dir: &Path,
    ) -> Result<SynthesisOutcome, SynthesisError> {
        tokio::fs::create_dir_all(work_dir)
            .await
            .map_err(SynthesisError::WorkDir)?;

        let extension = self.provider.audio_extension().to_string();

        tracing::info!(
            provider = self.provider.name(),
            segments = segments.len(),
            concurrency = self.concurrency,
            language = %language,
            work_dir = %work_dir.display(),
            "Starting segment synthesis"
        );

        // Built eagerly so the stream holds no borrowed closures across awaits
        let jobs: Vec<SynthesisJob> = segments
            .iter()
            .map(|segment| {
                SynthesisJob::new(
                    segment.clone(),
                    self.provider.name(),
                    voice,
                    language,
                    Self::segment_path(work_dir, segment.index, &extension),
                )
            })
            .collect();
        let pending: Vec<_> = jobs.into_iter().map(|job| self.run_job(job)).collect();

        let mut in_flight = stream::iter(pending).buffer_unordered(self.concurrency);

        let mut completed: Vec<Option<SynthesisJob>> = vec![None; segments.len()];

        while let Some(result) = in_flight.next().await {
            // Returning drops the stream, cancelling in-flight jobs and dispatching no more
            let job = result?;
            let slot = segments
                .iter()
                .position(|s| s.index == job.index())
                .unwrap_or(job.index());
            if let Some(entry) = completed.get_mut(slot) {
                *entry = Some(job);
            }
        }

        let jobs: Vec<SynthesisJob> = completed.into_iter().flatten().collect();

        tracing::info!(
            provider = self.provider.name(),
            synthesized = jobs.iter().filter(|j| !j.resumed).count(),
            resumed = jobs.iter().filter(|j| j.resumed).count(),
            "Segment synthesis finished"
        );

        Ok(SynthesisOutcome { jobs })
    }

    async fn run_job(&self, mut job: SynthesisJob) -> Result<SynthesisJob, SynthesisError> {
        if already_synthesized(&job.audio_path).await {
            tracing::debug!(segment = job.index(), "Segment audio present, skipping");
            job.resume_from_disk();
            return Ok(job);
        }

        let request = SynthesisRequest {
            text: job.segment.text.clone(),
            voice: job.voice.clone(),
            language: job.language,
            model: self.model.clone(),
        };

        let audio = loop {
            job.begin_attempt();

            match self.provider.synthesize(&request).await {
                Ok(audio) => break audio,
                Err(e) => {
                    tracing::warn!(
                        segment = job.index(),
                        attempt = job.attempts,
                        max_attempts = self.retry_policy.max_attempts(),
                        error = %e,
                        "Segment synthesis attempt failed"
                    );

                    if !self.retry_policy.should_retry(job.attempts, &e) {
                        job.fail();
                        tracing::error!(
                            segment = job.index(),
                            attempts = job.attempts,
                            error = %e,
                            "Segment synthesis failed"
                        );
                        return Err(SynthesisError::Provider {
                            index: job.index(),
                            attempts: job.attempts,
                            source: e,
                        });
                    }

                    self.retry_policy.wait_before_retry(job.attempts, &e).await;
                }
            }
        };

        write_atomically(&job.audio_path, &audio)
            .await
            .map_err(|source| SynthesisError::Io {
                index: job.index(),
                source,
            })?;

        job.succeed();

        tracing::debug!(
            segment = job.index(),
            attempts = job.attempts,
            audio_size = audio.len(),
            "Segment synthesized"
        );

        Ok(job)
    }
}

async fn already_synthesized(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Write to a sibling `.part` file then rename, so the final path only ever holds complete audio.
async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    tokio::fs::write(&partial, bytes).await?;
    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    Ok(())
}
