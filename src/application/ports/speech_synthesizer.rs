//! Speech Synthesizer Port - 语音合成抽象
//!
//! 定义 TTS 合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AudioPayload;

/// 语音合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No audio data received from API")]
    EmptyAudio,
}

/// Speech Synthesizer Port
///
/// 外部 TTS 服务的抽象接口。
/// 空白文本直接返回空载荷，不调用远端服务。
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// 合成文本，返回传输编码（base64）的 PCM 载荷
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError>;

    /// 当前使用的音色（用于缓存 key）
    fn voice(&self) -> &str;

    /// 检查 TTS 服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}

/// 文本是否为空白（空白文本不需要合成）
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
