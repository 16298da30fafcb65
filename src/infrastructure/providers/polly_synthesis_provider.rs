use super::synthesis_provider::{ProviderError, SynthesisProvider, SynthesisRequest};
use crate::domain::assembly::AudioContainer;
use crate::domain::narration::LanguageCode;
use async_trait::async_trait;
use aws_sdk_polly::{
    error::{ProvideErrorMetadata, SdkError},
    operation::synthesize_speech::SynthesizeSpeechError,
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::io::Cursor;
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
pub const MAX_SEGMENT_CHARS: usize = 3000;

/// Polly returns raw 16-bit mono PCM at this rate when asked for PCM
const PCM_SAMPLE_RATE: u32 = 16000;

/// AWS Polly implementation of the synthesis provider
pub struct PollySynthesisProvider {
    polly_client: Arc<PollyClient>,
    container: AudioContainer,
}

impl PollySynthesisProvider {
    pub fn new(polly_client: Arc<PollyClient>, container: AudioContainer) -> Self {
        Self {
            polly_client,
            container,
        }
    }

    /// Select the appropriate Polly voice for a language
    fn get_voice_for_language(language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "Joanna",
            LanguageCode::Spanish => "Lupe",
            LanguageCode::French => "Lea",
            LanguageCode::German => "Vicki",
            LanguageCode::Italian => "Bianca",
            LanguageCode::Portuguese => "Ines",
        }
    }

    fn output_format(&self) -> OutputFormat {
        match self.container {
            AudioContainer::Wav => OutputFormat::Pcm,
            AudioContainer::Mp3 => OutputFormat::Mp3,
        }
    }
}

/// Wrap Polly's headerless PCM stream into a WAV container.
fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, ProviderError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| ProviderError::fatal(format!("Failed to start WAV stream: {}", e)))?;
        for frame in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([frame[0], frame[1]]))
                .map_err(|e| ProviderError::fatal(format!("Failed to write PCM sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| ProviderError::fatal(format!("Failed to finalize WAV stream: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

fn classify_polly_error<R>(error: &SdkError<SynthesizeSpeechError, R>) -> ProviderError
where
    R: std::fmt::Debug,
{
    match error {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            ProviderError::retryable(format!("AWS Polly transport error: {:?}", error))
        }
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            let code = service_error.code().unwrap_or("Unknown");
            let message = service_error.message().unwrap_or("no message").to_string();

            if service_error.is_service_failure_exception()
                || code == "ThrottlingException"
                || code == "ServiceUnavailable"
            {
                ProviderError::retryable(format!("AWS Polly {}: {}", code, message))
            } else {
                ProviderError::fatal(format!("AWS Polly {}: {}", code, message))
            }
        }
        _ => ProviderError::fatal(format!("AWS Polly error: {:?}", error)),
    }
}

#[async_trait]
impl SynthesisProvider for PollySynthesisProvider {
    fn name(&self) -> &str {
        "polly"
    }

    fn audio_extension(&self) -> &str {
        self.container.extension()
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        let voice_name = if request.voice.is_empty() {
            Self::get_voice_for_language(request.language).to_string()
        } else {
            request.voice.clone()
        };
        let voice_id = VoiceId::from(voice_name.as_str());
        let engine = Engine::Neural;
        let output_format = self.output_format();

        tracing::info!(
            language = %request.language,
            voice = %voice_name,
            engine = ?engine,
            output_format = ?output_format,
            text_length = request.text.chars().count(),
            "Calling AWS Polly synthesize_speech"
        );

        let mut call = self
            .polly_client
            .synthesize_speech()
            .text(request.text.as_str())
            .voice_id(voice_id)
            .output_format(output_format.clone())
            .engine(engine);
        if self.container == AudioContainer::Wav {
            call = call.sample_rate(PCM_SAMPLE_RATE.to_string());
        }

        let result = call.send().await.map_err(|e| {
            let classified = classify_polly_error(&e);
            tracing::error!(
                error = %e,
                voice = %voice_name,
                retryable = matches!(classified, ProviderError::Retryable { .. }),
                "AWS Polly synthesize_speech failed"
            );
            classified
        })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            ProviderError::retryable(format!("Failed to read audio stream: {}", e))
        })?;
        let audio_bytes = audio_stream.into_bytes().to_vec();

        tracing::debug!(
            audio_size = audio_bytes.len(),
            "Audio stream collected successfully"
        );

        match self.container {
            AudioContainer::Wav => pcm_to_wav(&audio_bytes, PCM_SAMPLE_RATE),
            AudioContainer::Mp3 => Ok(audio_bytes),
        }
    }
}
