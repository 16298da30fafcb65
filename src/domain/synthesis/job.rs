use crate::domain::narration::{LanguageCode, Segment};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

/// Synthesis of one segment. Mutated only by the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisJob {
    pub segment: Segment,
    pub provider: String,
    pub voice: String,
    pub language: LanguageCode,
    pub status: JobStatus,
    pub audio_path: PathBuf,
    pub attempts: u32,
    /// Audio was already on disk from an earlier run
    pub resumed: bool,
}

impl SynthesisJob {
    pub fn new(
        segment: Segment,
        provider: impl Into<String>,
        voice: impl Into<String>,
        language: LanguageCode,
        audio_path: PathBuf,
    ) -> Self {
        Self {
            segment,
            provider: provider.into(),
            voice: voice.into(),
            language,
            status: JobStatus::Pending,
            audio_path,
            attempts: 0,
            resumed: false,
        }
    }

    pub fn index(&self) -> usize {
        self.segment.index
    }

    /// Entered for every attempt; retries loop back into this state
    pub(crate) fn begin_attempt(&mut self) {
        debug_assert!(matches!(self.status, JobStatus::Pending | JobStatus::InProgress));
        self.status = JobStatus::InProgress;
        self.attempts += 1;
    }

    pub(crate) fn succeed(&mut self) {
        self.status = JobStatus::Succeeded;
    }

    pub(crate) fn resume_from_disk(&mut self) {
        self.status = JobStatus::Succeeded;
        self.resumed = true;
    }

    pub(crate) fn fail(&mut self) {
        self.status = JobStatus::Failed;
    }
}
