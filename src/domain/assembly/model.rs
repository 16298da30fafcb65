use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Container of synthesized segments and of the assembled track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioContainer {
    Wav,
    Mp3,
}

impl AudioContainer {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioContainer::Wav => "wav",
            AudioContainer::Mp3 => "mp3",
        }
    }

    /// Codec ffmpeg encodes to for this container
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            AudioContainer::Wav => "pcm_s16le",
            AudioContainer::Mp3 => "libmp3lame",
        }
    }
}

impl FromStr for AudioContainer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wav" => Ok(AudioContainer::Wav),
            "mp3" => Ok(AudioContainer::Mp3),
            other => Err(format!("Unsupported audio format: {}", other)),
        }
    }
}

/// Format every assembled track is written in, whichever backend runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFormat {
    pub container: AudioContainer,
    pub sample_rate: u32,
    pub channels: u16,
    /// Ignored for uncompressed containers
    pub bitrate_kbps: u32,
}

impl Default for TargetFormat {
    fn default() -> Self {
        Self {
            container: AudioContainer::Wav,
            sample_rate: 24000,
            channels: 1,
            bitrate_kbps: 128,
        }
    }
}

/// A finished track; `segments` lists the inputs in index order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledTrack {
    pub segments: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub duration: Duration,
    /// Backend that produced the file
    pub backend: String,
}

impl AssembledTrack {
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}
