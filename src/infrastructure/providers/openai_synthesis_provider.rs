use super::synthesis_provider::{ProviderError, SynthesisProvider, SynthesisRequest};
use crate::domain::assembly::AudioContainer;
use crate::domain::narration::LanguageCode;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
pub const MAX_SEGMENT_CHARS: usize = 4096;

/// OpenAI speech API implementation of the synthesis provider
pub struct OpenAiSynthesisProvider {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    default_voice: String,
    container: AudioContainer,
}

impl OpenAiSynthesisProvider {
    pub fn new(
        client: Arc<Client<OpenAIConfig>>,
        model: String,
        default_voice: String,
        container: AudioContainer,
    ) -> Self {
        Self {
            client,
            model,
            default_voice,
            container,
        }
    }

    /// Select the appropriate OpenAI voice for a language
    /// Based on voice characteristics that suit each language
    fn get_voice_for_language(language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "alloy",   // Neutral American accent
            LanguageCode::Spanish => "echo",    // Warm, clear for Spanish
            LanguageCode::French => "nova",     // Soft, suitable for French
            LanguageCode::German => "onyx",     // Clear, authoritative
            LanguageCode::Italian => "fable",   // Expressive for Italian
            LanguageCode::Portuguese => "shimmer", // Clear articulation
        }
    }

    fn resolve_voice(&self, request: &SynthesisRequest) -> String {
        if !request.voice.is_empty() {
            request.voice.clone()
        } else if !self.default_voice.is_empty() {
            self.default_voice.clone()
        } else {
            Self::get_voice_for_language(request.language).to_string()
        }
    }

    fn parse_voice(voice: &str) -> Voice {
        match voice.to_lowercase().as_str() {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy, // Default fallback
        }
    }

    fn parse_model(model: &str) -> SpeechModel {
        match model {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn response_format(&self) -> SpeechResponseFormat {
        match self.container {
            AudioContainer::Wav => SpeechResponseFormat::Wav,
            AudioContainer::Mp3 => SpeechResponseFormat::Mp3,
        }
    }
}

/// Map an async-openai error onto the retryable/fatal split.
fn classify_openai_error(error: &OpenAIError) -> ProviderError {
    match error {
        OpenAIError::Reqwest(e) => {
            if let Some(status) = e.status() {
                return ProviderError::from_status(status.as_u16(), e.to_string(), None);
            }
            if e.is_timeout() || e.is_connect() {
                return ProviderError::retryable(format!("OpenAI transport error: {}", e));
            }
            ProviderError::retryable(format!("OpenAI request error: {}", e))
        }
        OpenAIError::ApiError(api) => {
            let kind = format!("{:?} {:?}", api.r#type, api.code).to_lowercase();
            if kind.contains("insufficient_quota")
                || kind.contains("invalid_api_key")
                || kind.contains("invalid_request")
            {
                ProviderError::fatal(format!("OpenAI API error: {}", api.message))
            } else if kind.contains("rate_limit") || kind.contains("server_error") {
                ProviderError::retryable(format!("OpenAI API error: {}", api.message))
            } else {
                ProviderError::fatal(format!("OpenAI API error: {}", api.message))
            }
        }
        other => ProviderError::fatal(format!("OpenAI TTS error: {}", other)),
    }
}

#[async_trait]
impl SynthesisProvider for OpenAiSynthesisProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn audio_extension(&self) -> &str {
        self.container.extension()
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        let start_time = std::time::Instant::now();
        let voice = self.resolve_voice(request);
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());

        tracing::info!(
            model = %model,
            voice = %voice,
            language = %request.language,
            text_length = request.text.chars().count(),
            "Calling OpenAI TTS API"
        );

        let speech_request = CreateSpeechRequest {
            model: Self::parse_model(&model),
            input: request.text.clone(),
            voice: Self::parse_voice(&voice),
            response_format: Some(self.response_format()),
            speed: None, // Defaults to 1.0
        };

        let response = self
            .client
            .audio()
            .speech(speech_request)
            .await
            .map_err(|e| {
                let classified = classify_openai_error(&e);
                tracing::error!(
                    error = %e,
                    model = %model,
                    voice = %voice,
                    retryable = matches!(classified, ProviderError::Retryable { .. }),
                    "OpenAI TTS API call failed"
                );
                classified
            })?;

        let audio_bytes = response.bytes.to_vec();

        tracing::debug!(
            provider = "openai",
            latency_ms = start_time.elapsed().as_millis() as u64,
            audio_size_bytes = audio_bytes.len(),
            "OpenAI TTS audio received"
        );

        Ok(audio_bytes)
    }
}
