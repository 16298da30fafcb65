use super::concat_backend::{ConcatBackend, ConcatError};
use crate::domain::assembly::{AudioContainer, TargetFormat};
use async_trait::async_trait;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Joins WAV segments sample by sample with `hound`. No external process involved.
#[derive(Debug, Default, Clone)]
pub struct WavConcatBackend;

impl WavConcatBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Duration from the WAV header: frames / sample rate.
pub fn wav_duration(path: &Path) -> Result<Duration, ConcatError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    Ok(frames_to_duration(reader.duration() as u64, spec.sample_rate))
}

fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(frames as f64 / sample_rate as f64)
}

fn matches_target(spec: &WavSpec, target: &TargetFormat) -> bool {
    spec.sample_rate == target.sample_rate && spec.channels == target.channels
}

fn inputs_supported(inputs: &[PathBuf], target: &TargetFormat) -> bool {
    if target.container != AudioContainer::Wav || inputs.is_empty() {
        return false;
    }

    let mut first: Option<WavSpec> = None;
    for input in inputs {
        let Ok(reader) = WavReader::open(input) else {
            return false;
        };
        let spec = reader.spec();
        if !matches_target(&spec, target) {
            return false;
        }
        match first {
            None => first = Some(spec),
            Some(ref f) if *f != spec => return false,
            Some(_) => {}
        }
    }
    true
}

fn concat_blocking(inputs: &[PathBuf], output: &Path) -> Result<Duration, ConcatError> {
    let first = inputs
        .first()
        .ok_or_else(|| ConcatError::Unsupported("no inputs".to_string()))?;
    let spec = WavReader::open(first)?.spec();

    let mut writer = WavWriter::create(output, spec)?;
    let mut total_frames: u64 = 0;

    for input in inputs {
        let mut reader = WavReader::open(input)?;
        if reader.spec() != spec {
            return Err(ConcatError::Unsupported(format!(
                "{} has a different WAV layout",
                input.display()
            )));
        }
        total_frames += reader.duration() as u64;

        match spec.sample_format {
            SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    writer.write_sample(sample?)?;
                }
            }
            SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    writer.write_sample(sample?)?;
                }
            }
        }
    }

    writer.finalize()?;
    Ok(frames_to_duration(total_frames, spec.sample_rate))
}

#[async_trait]
impl ConcatBackend for WavConcatBackend {
    fn name(&self) -> &str {
        "wav"
    }

    async fn supports(&self, inputs: &[PathBuf], target: &TargetFormat) -> bool {
        let inputs = inputs.to_vec();
        let target = *target;
        tokio::task::spawn_blocking(move || inputs_supported(&inputs, &target))
            .await
            .unwrap_or(false)
    }

    async fn concat(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        _target: &TargetFormat,
    ) -> Result<Duration, ConcatError> {
        let inputs = inputs.to_vec();
        let output = output.to_path_buf();
        tokio::task::spawn_blocking(move || concat_blocking(&inputs, &output))
            .await
            .map_err(|e| ConcatError::Process(format!("wav concat task failed: {}", e)))?
    }
}
