use super::cleaner::clean_text;
use super::dto::{
    BatchNarrationResult, NarrationRequest, NarrationResponse, ReadinessReport, UploadRequest,
};
use super::error::NarrationServiceError;
use super::framer::NarrationFramer;
use super::language::{detect_language, LanguageCode};
use super::model::NarrationText;
use super::registry::ActiveJobs;
use super::segmenter::TextSegmenter;
use crate::domain::assembly::AudioAssembler;
use crate::domain::synthesis::SynthesisOrchestrator;
use crate::domain::upload::{content_type_for, ResumableUploader, UploadMetadata, UploadOutcome};
use crate::infrastructure::audio::FfmpegConcatBackend;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Defaults applied to every track
#[derive(Debug, Clone)]
pub struct NarrationSettings {
    pub work_dir: PathBuf,
    pub output_dir: PathBuf,
    pub segment_max_chars: usize,
    pub default_intro: Option<String>,
    pub default_outro: Option<String>,
}

pub struct NarrationService {
    framer: NarrationFramer,
    segmenter: TextSegmenter,
    orchestrator: Arc<SynthesisOrchestrator>,
    assembler: Arc<AudioAssembler>,
    uploader: Option<Arc<ResumableUploader>>,
    settings: NarrationSettings,
    active_jobs: ActiveJobs,
    ffmpeg: FfmpegConcatBackend,
}

impl NarrationService {
    pub fn new(
        framer: NarrationFramer,
        orchestrator: Arc<SynthesisOrchestrator>,
        assembler: Arc<AudioAssembler>,
        uploader: Option<Arc<ResumableUploader>>,
        settings: NarrationSettings,
    ) -> Self {
        Self {
            framer,
            segmenter: TextSegmenter::new(settings.segment_max_chars),
            orchestrator,
            assembler,
            uploader,
            settings,
            active_jobs: ActiveJobs::new(),
            ffmpeg: FfmpegConcatBackend::default(),
        }
    }

    pub fn active_jobs(&self) -> &ActiveJobs {
        &self.active_jobs
    }
}

#[async_trait]
pub trait NarrationServiceApi: Send + Sync {
    /// Turn one narration script into one assembled track, optionally uploaded
    ///
    /// This operation:
    /// - Cleans the text if asked, detects the language when not given
    /// - Frames it with the canonical intro/outro
    /// - Segments, synthesizes with bounded retry, assembles in index order
    /// - Uploads the track (or caller-composed media) when upload metadata is present
    async fn run_track(
        &self,
        request: NarrationRequest,
    ) -> Result<NarrationResponse, NarrationServiceError>;

    /// Run independent tracks concurrently; one failing track does not affect the others
    async fn run_tracks(&self, requests: Vec<NarrationRequest>) -> Vec<BatchNarrationResult>;

    async fn readiness(&self) -> ReadinessReport;
}

#[async_trait]
impl NarrationServiceApi for NarrationService {
    async fn run_track(
        &self,
        request: NarrationRequest,
    ) -> Result<NarrationResponse, NarrationServiceError> {
        validate_job_id(&request.job_id)?;

        tracing::info!(
            job_id = %request.job_id,
            text_length = request.text.chars().count(),
            upload = request.upload.is_some(),
            "Narration track requested"
        );

        // 1. Clean the text (remove HTML, URLs, normalize whitespace) when asked
        let text = if request.clean_text {
            clean_text(&request.text)
        } else {
            request.text.clone()
        };
        if text.trim().is_empty() {
            return Err(NarrationServiceError::Invalid(
                "Text cannot be empty".to_string(),
            ));
        }

        if let Some(upload) = &request.upload {
            if self.uploader.is_none() {
                return Err(NarrationServiceError::UploadUnavailable);
            }
            if upload.title.trim().is_empty() {
                return Err(NarrationServiceError::Invalid(
                    "Upload title cannot be empty".to_string(),
                ));
            }
        }

        // 2. Resolve the language
        let language = resolve_language(request.language.as_deref(), &text)?;

        // 3. One caller per (job, language)
        let _claim = self
            .active_jobs
            .claim(&request.job_id, language)
            .ok_or_else(|| {
                NarrationServiceError::Conflict(format!(
                    "{} ({}) is already running",
                    request.job_id, language
                ))
            })?;

        // 4. Frame and segment
        let mut narration = NarrationText::new(text, language);
        narration.intro = request
            .intro
            .clone()
            .or_else(|| self.settings.default_intro.clone());
        narration.outro = request
            .outro
            .clone()
            .or_else(|| self.settings.default_outro.clone());

        let framed = self.framer.frame(&narration, request.open_hook);
        let segments = self.segmenter.segment(&framed);

        tracing::info!(
            job_id = %request.job_id,
            language = %language,
            segment_count = segments.len(),
            framed_length = framed.chars().count(),
            "Narration framed and segmented"
        );

        // 5. Synthesize every segment
        let work_dir = self.work_dir(&request.job_id, language);
        let voice = request.voice.clone().unwrap_or_default();
        let outcome = self
            .orchestrator
            .synthesize_all(&segments, &voice, language, &work_dir)
            .await?;

        // 6. Assemble; segment files are removed on success
        let output_path = self.track_path(&request.job_id, language);
        let track = self
            .assembler
            .assemble(&outcome.audio_paths(), &output_path)
            .await?;
        remove_dir_if_empty(&work_dir).await;

        let mut response = NarrationResponse {
            job_id: request.job_id.clone(),
            language,
            segment_count: segments.len(),
            resumed_segments: outcome.resumed_count(),
            track_path: track.output_path.clone(),
            duration_secs: track.duration_secs(),
            resource_id: None,
            warnings: Vec::new(),
            completed_at: Utc::now(),
        };

        // 7. Upload
        if let Some(upload) = &request.upload {
            let uploaded = self
                .upload(upload, &track.output_path, language)
                .await?;
            response.resource_id = Some(uploaded.resource_id);
            response.warnings.extend(uploaded.warnings);
            response.completed_at = Utc::now();
        }

        tracing::info!(
            job_id = %response.job_id,
            language = %language,
            duration_secs = response.duration_secs,
            resource_id = ?response.resource_id,
            "Narration track finished"
        );

        Ok(response)
    }

    async fn run_tracks(&self, requests: Vec<NarrationRequest>) -> Vec<BatchNarrationResult> {
        let runs = requests.into_iter().map(|request| async move {
            let job_id = request.job_id.clone();
            let language = request.language.clone();
            match self.run_track(request).await {
                Ok(narration) => BatchNarrationResult {
                    job_id,
                    language: Some(narration.language.to_string()),
                    narration: Some(narration),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Narration track failed");
                    BatchNarrationResult {
                        job_id,
                        language,
                        narration: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        });

        join_all(runs).await
    }

    async fn readiness(&self) -> ReadinessReport {
        ReadinessReport {
            status: "ready".to_string(),
            providers: self
                .orchestrator
                .provider_name()
                .split('>')
                .map(str::to_string)
                .collect(),
            upload: self.uploader.is_some(),
            ffmpeg: self.ffmpeg.is_available().await,
            running_jobs: self.active_jobs.len(),
        }
    }
}

impl NarrationService {
    fn work_dir(&self, job_id: &str, language: LanguageCode) -> PathBuf {
        self.settings.work_dir.join(job_id).join(language.as_str())
    }

    fn track_path(&self, job_id: &str, language: LanguageCode) -> PathBuf {
        self.settings.output_dir.join(job_id).join(format!(
            "narration_{}.{}",
            language,
            self.assembler.target().container.extension()
        ))
    }

    async fn upload(
        &self,
        upload: &UploadRequest,
        track_path: &Path,
        language: LanguageCode,
    ) -> Result<UploadOutcome, NarrationServiceError> {
        let uploader = self
            .uploader
            .as_ref()
            .ok_or(NarrationServiceError::UploadUnavailable)?;

        let media_path = upload.media_path.as_deref().unwrap_or(track_path);
        let mut metadata = UploadMetadata::new(upload.title.clone());
        metadata.description = upload.description.clone();
        metadata.tags = upload.tags.clone();
        metadata.category_id = upload.category_id.clone();
        metadata.language = Some(language.as_str().to_string());
        metadata.content_type = content_type_for(media_path).to_string();
        if let Some(privacy) = &upload.privacy_status {
            metadata.privacy_status = privacy.clone();
        }

        Ok(uploader
            .upload(media_path, &metadata, upload.cover_image.as_deref())
            .await?)
    }
}

/// Job ids name directories, so only a conservative charset is accepted
fn validate_job_id(job_id: &str) -> Result<(), NarrationServiceError> {
    let valid = !job_id.is_empty()
        && job_id.len() <= 128
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(NarrationServiceError::Invalid(format!(
            "job_id must be 1-128 characters of [A-Za-z0-9_-], got {:?}",
            job_id
        )))
    }
}

fn resolve_language(
    requested: Option<&str>,
    text: &str,
) -> Result<LanguageCode, NarrationServiceError> {
    match requested.map(str::trim) {
        None | Some("") | Some("auto") => {
            let detected = detect_language(text);
            tracing::info!(language_detected = %detected, "Language detected");
            Ok(detected)
        }
        Some(code) => code.parse().map_err(NarrationServiceError::Invalid),
    }
}

async fn remove_dir_if_empty(dir: &Path) {
    // Fails harmlessly when something (e.g. a stale .part file) is left behind
    if tokio::fs::remove_dir(dir).await.is_ok() {
        tracing::debug!(dir = %dir.display(), "Work directory removed");
    }
}
