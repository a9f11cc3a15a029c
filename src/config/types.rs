//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini API 配置
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 生成历史配置
    #[serde(default)]
    pub history: HistoryConfig,

    /// 语音缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Gemini API 配置
///
/// api_key 为空时使用离线的 fake 生成器和合成器
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    /// 卡片生成与图片识别模型
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// 语音合成模型
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// 预置音色
    #[serde(default = "default_voice")]
    pub voice: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_gemini_timeout() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            api_key: String::new(),
            text_model: default_text_model(),
            tts_model: default_tts_model(),
            voice: default_voice(),
            timeout_secs: default_gemini_timeout(),
        }
    }
}

impl GeminiConfig {
    /// 是否调用真实服务
    pub fn is_online(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// 音频输出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioOutput {
    /// 按时长计时，不接触声卡
    #[default]
    Simulated,
    /// 默认声卡（需要 `audio-output` feature）
    Device,
}

/// 音频配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// TTS 返回 PCM 的采样率（Hz）
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// TTS 返回 PCM 的声道数
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// 自动朗读：翻面后到开始读反面的间隔（毫秒）
    #[serde(default = "default_auto_read_delay")]
    pub auto_read_delay_ms: u64,

    #[serde(default)]
    pub output: AudioOutput,
}

fn default_sample_rate() -> u32 {
    24000
}

fn default_channels() -> u16 {
    1 // 单声道
}

fn default_auto_read_delay() -> u64 {
    200
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            auto_read_delay_ms: default_auto_read_delay(),
            output: AudioOutput::default(),
        }
    }
}

impl AudioConfig {
    pub fn auto_read_delay(&self) -> Duration {
        Duration::from_millis(self.auto_read_delay_ms)
    }
}

/// 生成历史配置
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最多保留的条数
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/quickflash.db".to_string()
}

fn default_max_items() -> usize {
    50
}

fn default_max_connections() -> u32 {
    5
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_items: default_max_items(),
            max_connections: default_max_connections(),
        }
    }
}

impl HistoryConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 语音缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Sled 数据库路径
    #[serde(default = "default_cache_path")]
    pub path: String,

    /// 最大缓存大小（字节）
    #[serde(default = "default_cache_size")]
    pub max_size_bytes: u64,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_path() -> String {
    "data/speech.sled".to_string()
}

fn default_cache_size() -> u64 {
    256 * 1024 * 1024 // 256 MB
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            path: default_cache_path(),
            max_size_bytes: default_cache_size(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
