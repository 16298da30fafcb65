use super::error::AssemblyError;
use super::model::{AssembledTrack, TargetFormat};
use crate::infrastructure::audio::{ConcatBackend, FfmpegConcatBackend, WavConcatBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Joins ordered segment audio into one track.
///
/// Either the complete track appears at the output path or nothing does; segment
/// intermediates are removed only after the track is in place.
pub struct AudioAssembler {
    backends: Vec<Arc<dyn ConcatBackend>>,
    target: TargetFormat,
    cleanup: bool,
}

impl AudioAssembler {
    /// Backends are tried in the given order.
    pub fn new(backends: Vec<Arc<dyn ConcatBackend>>, target: TargetFormat) -> Self {
        Self {
            backends,
            target,
            cleanup: true,
        }
    }

    /// Native WAV compositing first, ffmpeg as the fallback.
    pub fn with_default_backends(target: TargetFormat) -> Self {
        Self::new(
            vec![
                Arc::new(WavConcatBackend::new()) as Arc<dyn ConcatBackend>,
                Arc::new(FfmpegConcatBackend::default()) as Arc<dyn ConcatBackend>,
            ],
            target,
        )
    }

    /// Keep segment files after a successful assembly
    pub fn keep_intermediates(mut self) -> Self {
        self.cleanup = false;
        self
    }

    pub fn target(&self) -> &TargetFormat {
        &self.target
    }

    pub async fn assemble(
        &self,
        segments: &[PathBuf],
        output: &Path,
    ) -> Result<AssembledTrack, AssemblyError> {
        if segments.is_empty() {
            return Err(AssemblyError::NoSegments);
        }

        Self::validate_segments(segments).await?;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;

        let mut last_error = None;

        for backend in &self.backends {
            if !backend.supports(segments, &self.target).await {
                tracing::debug!(backend = backend.name(), "Concat backend skipped");
                continue;
            }

            // Written beside the destination so the final rename stays on one filesystem
            let staging = tempfile::Builder::new()
                .prefix(".assembling_")
                .suffix(&format!(".{}", self.target.container.extension()))
                .tempfile_in(&dir)?
                .into_temp_path();

            match backend.concat(segments, &staging, &self.target).await {
                Ok(duration) => {
                    staging
                        .persist(output)
                        .map_err(|e| AssemblyError::Io(e.error))?;

                    tracing::info!(
                        backend = backend.name(),
                        segments = segments.len(),
                        duration_secs = duration.as_secs_f64(),
                        output = %output.display(),
                        "Track assembled"
                    );

                    if self.cleanup {
                        Self::remove_intermediates(segments).await;
                    }

                    return Ok(AssembledTrack {
                        segments: segments.to_vec(),
                        output_path: output.to_path_buf(),
                        duration,
                        backend: backend.name().to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        backend = backend.name(),
                        error = %e,
                        "Concat backend failed, trying next"
                    );
                    last_error = Some(AssemblyError::Backend {
                        backend: backend.name().to_string(),
                        source: e,
                    });
                }
            }
        }

        Err(last_error.unwrap_or(AssemblyError::NoBackend))
    }

    async fn validate_segments(segments: &[PathBuf]) -> Result<(), AssemblyError> {
        for (index, path) in segments.iter().enumerate() {
            let metadata = match tokio::fs::metadata(path).await {
                Ok(m) if m.is_file() => m,
                _ => {
                    return Err(AssemblyError::MissingSegment {
                        index,
                        path: path.clone(),
                    })
                }
            };
            if metadata.len() == 0 {
                return Err(AssemblyError::EmptySegment {
                    index,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }

    async fn remove_intermediates(segments: &[PathBuf]) {
        for path in segments {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove segment file");
            }
        }
    }
}
