use crate::domain::assembly::{AudioContainer, TargetFormat};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Storage
    pub work_dir: PathBuf,
    pub output_dir: PathBuf,
    // Synthesis providers, in fallback order
    pub tts_providers: Vec<ProviderKind>,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub openai_tts_voice: Option<String>,
    pub aws_region: String,
    // Segmentation and synthesis
    pub segment_max_chars: usize,
    pub synthesis_max_attempts: u32,
    pub synthesis_base_delay_ms: u64,
    pub synthesis_max_delay_ms: u64,
    pub synthesis_concurrency: usize,
    // Assembly
    pub audio_format: AudioContainer,
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
    pub audio_bitrate_kbps: u32,
    // Framing
    pub framing_window_chars: usize,
    pub narration_intro: Option<String>,
    pub narration_outro: Option<String>,
    // Upload
    pub upload_access_token: Option<String>,
    pub upload_chunk_size: usize,
    pub upload_max_retries: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Polly,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "polly" => Ok(ProviderKind::Polly),
            other => Err(format!("Unknown TTS provider: {}", other)),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Unset or blank means "not configured"
fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_providers(raw: &str) -> Result<Vec<ProviderKind>, String> {
    raw.split(',')
        .filter(|p| !p.trim().is_empty())
        .map(ProviderKind::from_str)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: var_or("HOST", "0.0.0.0"),
            port: var_or("PORT", "8080").parse()?,
            environment: match var_or("ENVIRONMENT", "development").as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match var_or("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            work_dir: PathBuf::from(var_or("WORK_DIR", "./work")),
            output_dir: PathBuf::from(var_or("OUTPUT_DIR", "./output")),
            tts_providers: parse_providers(&var_or("TTS_PROVIDERS", "openai,polly"))?,
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_tts_model: var_or("OPENAI_TTS_MODEL", "tts-1-hd"),
            openai_tts_voice: optional_var("OPENAI_TTS_VOICE"),
            aws_region: var_or("AWS_REGION", "eu-west-1"),
            segment_max_chars: var_or("SEGMENT_MAX_CHARS", "4096").parse()?,
            synthesis_max_attempts: var_or("SYNTHESIS_MAX_ATTEMPTS", "4").parse()?,
            synthesis_base_delay_ms: var_or("SYNTHESIS_BASE_DELAY_MS", "1000").parse()?,
            synthesis_max_delay_ms: var_or("SYNTHESIS_MAX_DELAY_MS", "8000").parse()?,
            synthesis_concurrency: var_or("SYNTHESIS_CONCURRENCY", "2").parse()?,
            audio_format: var_or("AUDIO_FORMAT", "wav").parse()?,
            audio_sample_rate: var_or("AUDIO_SAMPLE_RATE", "24000").parse()?,
            audio_channels: var_or("AUDIO_CHANNELS", "1").parse()?,
            audio_bitrate_kbps: var_or("AUDIO_BITRATE_KBPS", "128").parse()?,
            framing_window_chars: var_or("FRAMING_WINDOW_CHARS", "200").parse()?,
            narration_intro: optional_var("NARRATION_INTRO"),
            narration_outro: optional_var("NARRATION_OUTRO"),
            upload_access_token: optional_var("UPLOAD_ACCESS_TOKEN"),
            upload_chunk_size: var_or("UPLOAD_CHUNK_SIZE", "5242880").parse()?,
            upload_max_retries: var_or("UPLOAD_MAX_RETRIES", "3").parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn target_format(&self) -> TargetFormat {
        TargetFormat {
            container: self.audio_format,
            sample_rate: self.audio_sample_rate,
            channels: self.audio_channels,
            bitrate_kbps: self.audio_bitrate_kbps,
        }
    }

    pub fn synthesis_base_delay(&self) -> Duration {
        Duration::from_millis(self.synthesis_base_delay_ms)
    }

    pub fn synthesis_max_delay(&self) -> Duration {
        Duration::from_millis(self.synthesis_max_delay_ms)
    }
}
