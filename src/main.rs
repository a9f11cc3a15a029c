//! QuickFlash - AI 闪卡生成与朗读服务
//!
//! - Domain: deck/ (卡组、卡片、语音载荷)
//! - Application: audio (朗读控制、预取), viewer, export, commands, queries, ports
//! - Infrastructure: http, persistence, adapters, events

use std::sync::Arc;

use quickflash::application::audio::{AudioDecoder, ControllerConfig};
use quickflash::application::ports::{
    FlashcardGeneratorPort, PlaybackEnginePort, SpeechSynthesizerPort, TextExtractorPort,
};
use quickflash::config::{load_config, print_config, AppConfig, AudioOutput};
use quickflash::infrastructure::adapters::{
    CachedSpeechSynthesizer, FakeFlashcardGenerator, FakeSpeechSynthesizer, FakeSynthesizerConfig,
    GeminiClient, GeminiClientConfig, GeminiFlashcardGenerator, GeminiImageExtractor,
    GeminiSpeechSynthesizer, PlainTextExtractor, SimulatedPlaybackEngine,
};
use quickflash::infrastructure::events::EventPublisher;
use quickflash::infrastructure::http::{AppState, HttpServer, ServerConfig};
use quickflash::infrastructure::persistence::sled::{SledCacheConfig, SledSpeechCache};
use quickflash::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteHistoryStore,
};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},quickflash={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn create_playback_engine(output: AudioOutput) -> Arc<dyn PlaybackEnginePort> {
    match output {
        AudioOutput::Simulated => Arc::new(SimulatedPlaybackEngine::new()),
        #[cfg(feature = "audio-output")]
        AudioOutput::Device => Arc::new(quickflash::infrastructure::adapters::DevicePlaybackEngine::new()),
        #[cfg(not(feature = "audio-output"))]
        AudioOutput::Device => {
            tracing::warn!("Built without the audio-output feature, falling back to simulated playback");
            Arc::new(SimulatedPlaybackEngine::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("QuickFlash - AI Flashcards");
    print_config(&config);

    // 确保数据目录存在
    for path in [&config.history.path, &config.cache.path] {
        if let Some(parent) = std::path::Path::new(path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // 初始化历史数据库
    let db_config = DatabaseConfig {
        database_url: config.history.database_url(),
        max_connections: config.history.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;
    let history = Arc::new(SqliteHistoryStore::with_limit(pool, config.history.max_items));

    // 创建生成、合成、识别适配器
    let mut extractors: Vec<Arc<dyn TextExtractorPort>> = vec![Arc::new(PlainTextExtractor::new())];
    let (generator, synthesizer): (Arc<dyn FlashcardGeneratorPort>, Arc<dyn SpeechSynthesizerPort>) =
        if config.gemini.is_online() {
            let client = Arc::new(GeminiClient::new(GeminiClientConfig {
                base_url: config.gemini.base_url.clone(),
                api_key: config.gemini.api_key.clone(),
                text_model: config.gemini.text_model.clone(),
                tts_model: config.gemini.tts_model.clone(),
                voice: config.gemini.voice.clone(),
                timeout_secs: config.gemini.timeout_secs,
            })?);
            extractors.push(Arc::new(GeminiImageExtractor::new(client.clone())));
            (
                Arc::new(GeminiFlashcardGenerator::new(client.clone())),
                Arc::new(GeminiSpeechSynthesizer::new(client)),
            )
        } else {
            tracing::warn!("No Gemini API key configured, running offline");
            (
                Arc::new(FakeFlashcardGenerator::new()),
                Arc::new(FakeSpeechSynthesizer::new(FakeSynthesizerConfig {
                    sample_rate: config.audio.sample_rate,
                    ..Default::default()
                })),
            )
        };

    // 语音缓存
    let synthesizer: Arc<dyn SpeechSynthesizerPort> = if config.cache.enabled {
        let cache = SledSpeechCache::new(&SledCacheConfig {
            db_path: config.cache.path.clone(),
            max_size_bytes: config.cache.max_size_bytes,
        })?;
        Arc::new(CachedSpeechSynthesizer::new(synthesizer, Arc::new(cache)))
    } else {
        synthesizer
    };

    if !synthesizer.health_check().await {
        tracing::warn!("Speech service health check failed");
    }

    let controller_config = ControllerConfig {
        decoder: AudioDecoder::new(config.audio.sample_rate, config.audio.channels),
        auto_read_delay: config.audio.auto_read_delay(),
    };

    let state = AppState::new(
        generator,
        synthesizer,
        extractors,
        history,
        create_playback_engine(config.audio.output),
        Arc::new(EventPublisher::new()),
        controller_config,
    );

    let server = HttpServer::new(
        ServerConfig::new(&config.server.host, config.server.port),
        state,
    );

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
