use async_openai::{config::OpenAIConfig, Client as OpenAiClient};
use narrator_backend::controllers::narration::NarrationController;
use narrator_backend::domain::assembly::AudioAssembler;
use narrator_backend::domain::narration::{
    service::NarrationSettings, FramingPatterns, NarrationFramer, NarrationService,
};
use narrator_backend::domain::shared::RetryPolicy;
use narrator_backend::domain::synthesis::SynthesisOrchestrator;
use narrator_backend::domain::upload::ResumableUploader;
use narrator_backend::infrastructure::config::{Config, LogFormat, ProviderKind};
use narrator_backend::infrastructure::http::start_http_server;
use narrator_backend::infrastructure::providers::{
    openai_synthesis_provider, polly_synthesis_provider, OpenAiSynthesisProvider,
    PollySynthesisProvider, ProviderChain, SynthesisProvider, YouTubeUploadProvider,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        development = config.is_development(),
        "Starting Narrator Backend on {}:{}",
        config.host,
        config.port
    );

    tokio::fs::create_dir_all(&config.work_dir).await?;
    tokio::fs::create_dir_all(&config.output_dir).await?;

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Synthesis providers, in fallback order
    tracing::info!("Instantiating synthesis providers...");
    let mut providers: Vec<Arc<dyn SynthesisProvider>> = Vec::new();
    let mut segment_bound = config.segment_max_chars;

    for kind in &config.tts_providers {
        match kind {
            ProviderKind::OpenAi => {
                let Some(api_key) = config.openai_api_key.clone() else {
                    tracing::warn!("OPENAI_API_KEY not set, skipping OpenAI synthesis provider");
                    continue;
                };
                let client = OpenAiClient::with_config(OpenAIConfig::new().with_api_key(api_key));
                providers.push(Arc::new(OpenAiSynthesisProvider::new(
                    Arc::new(client),
                    config.openai_tts_model.clone(),
                    config.openai_tts_voice.clone().unwrap_or_default(),
                    config.audio_format,
                )));
                segment_bound = segment_bound.min(openai_synthesis_provider::MAX_SEGMENT_CHARS);
            }
            ProviderKind::Polly => {
                tracing::info!(
                    "Initializing AWS Polly client with region: {}",
                    config.aws_region
                );
                let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(aws_config::Region::new(config.aws_region.clone()))
                    .load()
                    .await;
                let polly_client = aws_sdk_polly::Client::new(&aws_config);
                providers.push(Arc::new(PollySynthesisProvider::new(
                    Arc::new(polly_client),
                    config.audio_format,
                )));
                segment_bound = segment_bound.min(polly_synthesis_provider::MAX_SEGMENT_CHARS);
            }
        }
    }

    if providers.is_empty() {
        tracing::warn!("No synthesis provider configured, narration requests will fail");
    }

    let chain = ProviderChain::new(providers).with_target(config.target_format());
    tracing::info!(
        providers = ?chain.provider_names(),
        segment_max_chars = segment_bound,
        "Synthesis provider chain ready"
    );

    // 2. Pipeline stages
    tracing::info!("Instantiating pipeline...");
    let retry_policy = RetryPolicy::new(
        config.synthesis_max_attempts,
        config.synthesis_base_delay(),
        config.synthesis_max_delay(),
    );
    let orchestrator = Arc::new(
        SynthesisOrchestrator::new(Arc::new(chain), retry_policy, config.synthesis_concurrency)
            .with_model(config.openai_tts_model.clone()),
    );
    let assembler = Arc::new(AudioAssembler::with_default_backends(config.target_format()));

    let uploader = match &config.upload_access_token {
        Some(token) => {
            tracing::info!(
                chunk_size = config.upload_chunk_size,
                max_retries = config.upload_max_retries,
                "Resumable uploads enabled"
            );
            Some(Arc::new(ResumableUploader::new(
                Arc::new(YouTubeUploadProvider::new(token.clone())),
                config.upload_chunk_size,
                config.upload_max_retries,
                config.synthesis_base_delay(),
                config.synthesis_max_delay(),
            )))
        }
        None => {
            tracing::info!("UPLOAD_ACCESS_TOKEN not set, uploads disabled");
            None
        }
    };

    // 3. Services
    tracing::info!("Instantiating services...");
    let framer = NarrationFramer::new(FramingPatterns::default(), config.framing_window_chars);
    let settings = NarrationSettings {
        work_dir: config.work_dir.clone(),
        output_dir: config.output_dir.clone(),
        segment_max_chars: segment_bound,
        default_intro: config.narration_intro.clone(),
        default_outro: config.narration_outro.clone(),
    };
    let narration_service = Arc::new(NarrationService::new(
        framer,
        orchestrator,
        assembler,
        uploader,
        settings,
    ));

    // 4. Controllers
    tracing::info!("Instantiating controllers...");
    let narration_controller = Arc::new(NarrationController::new(narration_service));

    let config = Arc::new(config);
    start_http_server(config, narration_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narrator_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narrator_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
