use serde::{Deserialize, Serialize};
use std::path::Path;

/// Descriptive metadata sent when an upload session is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_privacy_status")]
    pub privacy_status: String,
    #[serde(default)]
    pub category_id: Option<String>,
    /// ISO 639-1 code of the spoken language
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_privacy_status() -> String {
    "private".to_string()
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

impl UploadMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            privacy_status: default_privacy_status(),
            category_id: None,
            language: None,
            content_type: default_content_type(),
        }
    }

    /// Set `content_type` from the media file's extension
    pub fn with_content_type_for(mut self, path: &Path) -> Self {
        self.content_type = content_type_for(path).to_string();
        self
    }
}

pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub resource_id: String,
    pub bytes_sent: u64,
    /// Acknowledgments that advanced the offset
    pub chunks_acknowledged: usize,
    /// Non-fatal problems, e.g. a cover image that could not be attached
    pub warnings: Vec<String>,
}
