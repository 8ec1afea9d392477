use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use story_narrator::controllers::webhook::WebhookController;
use story_narrator::domain::audio::{AudioAssembler, AudioFormat};
use story_narrator::domain::story::{PipelineSettings, StoryService};
use story_narrator::domain::tts::VoiceSelector;
use story_narrator::infrastructure::config::{Config, LogFormat, TtsProvider};
use story_narrator::infrastructure::http::{build_router, start_http_server};
use story_narrator::infrastructure::repositories::{
    BunnyStorageRepository, LocalTtsRepository, OpenAiTtsRepository, PollyTtsRepository,
    StorageRepository, TtsRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        development = config.is_development(),
        "Starting story narrator on {}:{}",
        config.host,
        config.port
    );

    tokio::fs::create_dir_all(&config.artifact_dir).await?;
    tracing::info!(artifact_dir = %config.artifact_dir.display(), "Artifact directory ready");

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Synthesis backend
    let tts_repo = create_tts_repository(&config).await?;
    tracing::info!(provider = tts_repo.provider(), "Synthesis backend initialized");

    // 2. Object storage
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let storage_repo: Arc<dyn StorageRepository> = Arc::new(BunnyStorageRepository::new(
        http_client,
        BunnyStorageRepository::endpoint(
            &config.bunny_storage_host,
            config.bunny_storage_region.as_deref(),
        ),
        config.bunny_storage_zone.clone(),
        config.bunny_api_key.clone(),
    ));
    tracing::info!(
        storage_zone = %config.bunny_storage_zone,
        region = ?config.bunny_storage_region,
        "Storage backend initialized"
    );

    // 3. Pipeline pieces
    let voices = match &config.tts_voice {
        Some(voice) => {
            tracing::info!(voice = %voice, "All requests pinned to a single voice");
            VoiceSelector::single(voice, config.default_language, config.default_gender)
        }
        None => VoiceSelector::new(
            tts_repo.voices(),
            config.default_language,
            config.default_gender,
        ),
    };
    let assembler = AudioAssembler::new(
        AudioFormat {
            sample_rate: config.output_sample_rate,
            channels: config.output_channels,
        },
        config.audio_normalize,
        config.output_bitrate_kbps,
    );

    // 4. Services and controllers
    let story_service = Arc::new(StoryService::new(
        tts_repo,
        storage_repo,
        voices,
        assembler,
        PipelineSettings {
            chunk_size: config.chunk_size,
            synthesis_concurrency: config.synthesis_concurrency,
            artifact_dir: config.artifact_dir.clone(),
            keep_failed_uploads: config.keep_failed_uploads,
        },
    ));
    let webhook_controller = Arc::new(WebhookController::new(story_service));

    let app = build_router(
        webhook_controller,
        Duration::from_secs(config.request_timeout_secs),
    );

    start_http_server(config, app).await?;

    Ok(())
}

async fn create_tts_repository(
    config: &Config,
) -> Result<Arc<dyn TtsRepository>, Box<dyn std::error::Error>> {
    let repo: Arc<dyn TtsRepository> = match config.tts_provider {
        TtsProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .as_deref()
                .ok_or("OPENAI_API_KEY is required for the openai provider")?;
            Arc::new(OpenAiTtsRepository::from_credentials(
                api_key,
                config.openai_api_base.as_deref(),
                config.openai_tts_model.clone(),
            ))
        }
        TtsProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;

            tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

            let polly_client = aws_sdk_polly::Client::new(&aws_config);
            Arc::new(PollyTtsRepository::new(Arc::new(polly_client)))
        }
        TtsProvider::Local => Arc::new(LocalTtsRepository::new(
            config.local_tts_command.clone(),
            config.artifact_dir.clone(),
        )),
    };

    Ok(repo)
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "story_narrator=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
