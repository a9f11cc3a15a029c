//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `QUICKFLASH_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `QUICKFLASH_SERVER__PORT=8080`
/// - `QUICKFLASH_GEMINI__API_KEY=...`
/// - `QUICKFLASH_AUDIO__OUTPUT=device`
/// - `QUICKFLASH_HISTORY__PATH=/data/quickflash.db`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("gemini.base_url", "https://generativelanguage.googleapis.com")?
        .set_default("gemini.api_key", "")?
        .set_default("gemini.text_model", "gemini-2.5-flash")?
        .set_default("gemini.tts_model", "gemini-2.5-flash-preview-tts")?
        .set_default("gemini.voice", "Kore")?
        .set_default("gemini.timeout_secs", 120)?
        .set_default("audio.sample_rate", 24000)?
        .set_default("audio.channels", 1)?
        .set_default("audio.auto_read_delay_ms", 200)?
        .set_default("audio.output", "simulated")?
        .set_default("history.path", "data/quickflash.db")?
        .set_default("history.max_items", 50)?
        .set_default("history.max_connections", 5)?
        .set_default("cache.enabled", true)?
        .set_default("cache.path", "data/speech.sled")?
        .set_default("cache.max_size_bytes", 256_u64 * 1024 * 1024)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: QUICKFLASH_GEMINI__VOICE=Puck
    builder = builder.add_source(
        Environment::with_prefix("QUICKFLASH")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.gemini.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Gemini base URL cannot be empty".to_string(),
        ));
    }

    if config.audio.sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Audio sample rate cannot be 0".to_string(),
        ));
    }

    if !(1..=8).contains(&config.audio.channels) {
        return Err(ConfigError::ValidationError(format!(
            "Audio channels must be between 1 and 8, got {}",
            config.audio.channels
        )));
    }

    if config.history.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "History database path cannot be empty".to_string(),
        ));
    }

    if config.history.max_items == 0 {
        return Err(ConfigError::ValidationError(
            "History max_items cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    if config.gemini.is_online() {
        tracing::info!("Gemini: {} (api key set)", config.gemini.base_url);
        tracing::info!("Text Model: {}", config.gemini.text_model);
        tracing::info!("TTS Model: {} / voice {}", config.gemini.tts_model, config.gemini.voice);
        tracing::info!("Gemini Timeout: {}s", config.gemini.timeout_secs);
    } else {
        tracing::info!("Gemini: offline (no api key, using fake adapters)");
    }
    tracing::info!(
        "Audio: {} Hz, {} ch, output {:?}",
        config.audio.sample_rate,
        config.audio.channels,
        config.audio.output
    );
    tracing::info!("Auto Read Delay: {}ms", config.audio.auto_read_delay_ms);
    tracing::info!("History: {} (max {} items)", config.history.path, config.history.max_items);
    tracing::info!("Speech Cache Enabled: {}", config.cache.enabled);
    if config.cache.enabled {
        tracing::info!("Speech Cache: {} ({} bytes)", config.cache.path, config.cache.max_size_bytes);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
