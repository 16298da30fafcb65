use super::concat_backend::{ConcatBackend, ConcatError};
use super::wav_concat::wav_duration;
use crate::domain::assembly::{AudioContainer, TargetFormat};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Joins segments with the ffmpeg concat filter. Every input is resampled to the
/// target layout first, so segments from different providers can share a track.
#[derive(Debug, Clone)]
pub struct FfmpegConcatBackend {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for FfmpegConcatBackend {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegConcatBackend {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// True when the ffmpeg binary can be executed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg)
            .arg("-version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Container duration as reported by ffprobe
    pub async fn probe_duration(&self, path: &Path) -> Result<Duration, ConcatError> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ConcatError::Process(format!(
                "ffprobe exited with {}",
                output.status
            )));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let seconds = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConcatError::Process(format!("Unparseable duration: {}", raw.trim())))?;
        Ok(Duration::from_secs_f64(seconds.max(0.0)))
    }

    fn encode_args(target: &TargetFormat) -> Vec<String> {
        let mut args = vec![
            "-ar".to_string(),
            target.sample_rate.to_string(),
            "-ac".to_string(),
            target.channels.to_string(),
            "-c:a".to_string(),
            target.container.ffmpeg_codec().to_string(),
        ];
        if target.container == AudioContainer::Mp3 {
            args.push("-b:a".to_string());
            args.push(format!("{}k", target.bitrate_kbps));
        }
        args
    }
}

fn channel_layout(channels: u16) -> String {
    match channels {
        1 => "mono".to_string(),
        2 => "stereo".to_string(),
        n => format!("{}c", n),
    }
}

/// `[i:a]` of every input normalised to the target, then joined in input order.
fn filter_graph(inputs: usize, target: &TargetFormat) -> String {
    let layout = channel_layout(target.channels);
    let mut graph = String::new();
    for i in 0..inputs {
        graph.push_str(&format!(
            "[{i}:a]aresample={rate},aformat=channel_layouts={layout}[a{i}];",
            rate = target.sample_rate,
        ));
    }
    for i in 0..inputs {
        graph.push_str(&format!("[a{}]", i));
    }
    graph.push_str(&format!("concat=n={}:v=0:a=1[out]", inputs));
    graph
}

#[async_trait]
impl ConcatBackend for FfmpegConcatBackend {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn supports(&self, inputs: &[PathBuf], _target: &TargetFormat) -> bool {
        !inputs.is_empty() && self.is_available().await
    }

    async fn concat(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        target: &TargetFormat,
    ) -> Result<Duration, ConcatError> {
        tracing::debug!(inputs = inputs.len(), "Running ffmpeg concat filter");

        let mut command = Command::new(&self.ffmpeg);
        command.args(["-y", "-hide_banner", "-loglevel", "error"]);
        for input in inputs {
            command.arg("-i").arg(input);
        }
        let result = command
            .arg("-filter_complex")
            .arg(filter_graph(inputs.len(), target))
            .args(["-map", "[out]"])
            .args(Self::encode_args(target))
            .args(["-f", target.container.extension()])
            .arg(output)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ConcatError::Process(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        match target.container {
            AudioContainer::Wav => wav_duration(output),
            AudioContainer::Mp3 => self.probe_duration(output).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_graph_resamples_every_input_before_joining() {
        let graph = filter_graph(2, &TargetFormat::default());
        assert_eq!(
            graph,
            "[0:a]aresample=24000,aformat=channel_layouts=mono[a0];\
             [1:a]aresample=24000,aformat=channel_layouts=mono[a1];\
             [a0][a1]concat=n=2:v=0:a=1[out]"
        );
    }

    #[test]
    fn test_channel_layout_names() {
        assert_eq!(channel_layout(2), "stereo");
        assert_eq!(channel_layout(6), "6c");
    }

    #[test]
    fn test_encode_args_include_bitrate_only_for_mp3() {
        let wav = FfmpegConcatBackend::encode_args(&TargetFormat::default());
        assert!(!wav.contains(&"-b:a".to_string()));
        assert!(wav.contains(&"pcm_s16le".to_string()));

        let mp3 = FfmpegConcatBackend::encode_args(&TargetFormat {
            container: AudioContainer::Mp3,
            bitrate_kbps: 192,
            ..TargetFormat::default()
        });
        assert!(mp3.contains(&"192k".to_string()));
        assert!(mp3.contains(&"libmp3lame".to_string()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let backend = FfmpegConcatBackend::new("definitely-not-ffmpeg-binary", "nope");
        assert!(!backend.is_available().await);
        assert!(
            !backend
                .supports(&[PathBuf::from("a.wav")], &TargetFormat::default())
                .await
        );
    }
}
