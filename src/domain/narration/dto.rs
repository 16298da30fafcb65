use super::language::LanguageCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Request for POST /api/narrations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationRequest {
    pub job_id: String,
    pub text: String,
    /// ISO 639-1 code, or `auto`/absent to detect from the text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outro: Option<String>,
    /// Start on an open-form hook instead of the canonical intro
    #[serde(default)]
    pub open_hook: bool,
    /// Strip HTML and URLs before framing
    #[serde(default)]
    pub clean_text: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadRequest>,
}

impl NarrationRequest {
    pub fn new(job_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            text: text.into(),
            language: None,
            voice: None,
            intro: None,
            outro: None,
            open_hook: false,
            clean_text: false,
            upload: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Caller-composed media containing the track; the track itself when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<PathBuf>,
}

/// Response for POST /api/narrations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationResponse {
    pub job_id: String,
    pub language: LanguageCode,
    pub segment_count: usize,
    /// Segments found on disk from an earlier run
    pub resumed_segments: usize,
    pub track_path: PathBuf,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub warnings: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Request for POST /api/narrations/batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchNarrationRequest {
    pub narrations: Vec<NarrationRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchNarrationResult {
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<NarrationResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchNarrationResponse {
    pub results: Vec<BatchNarrationResult>,
}

/// Body of GET /health/ready
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub status: String,
    pub providers: Vec<String>,
    pub upload: bool,
    pub ffmpeg: bool,
    pub running_jobs: usize,
}
