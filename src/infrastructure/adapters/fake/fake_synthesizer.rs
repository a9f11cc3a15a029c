//! Fake Speech Synthesizer - 离线模式的语音合成
//!
//! 不调用外部服务，按文本长度生成一段低音量正弦波 PCM

use async_trait::async_trait;
use std::time::Duration;

use crate::application::audio::encode_pcm;
use crate::application::ports::{is_blank, SpeechSynthesizerPort, SynthesisError};
use crate::domain::AudioPayload;

/// Fake Synthesizer 配置
#[derive(Debug, Clone)]
pub struct FakeSynthesizerConfig {
    pub sample_rate: u32,
    /// 每个字符对应的朗读时长（毫秒）
    pub millis_per_char: u64,
    /// 模拟网络延迟
    pub latency: Duration,
}

impl Default for FakeSynthesizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000,
            millis_per_char: 60,
            latency: Duration::from_millis(200),
        }
    }
}

/// Fake Speech Synthesizer
pub struct FakeSpeechSynthesizer {
    config: FakeSynthesizerConfig,
}

impl FakeSpeechSynthesizer {
    pub fn new(config: FakeSynthesizerConfig) -> Self {
        tracing::info!(
            sample_rate = config.sample_rate,
            latency_ms = config.latency.as_millis() as u64,
            "FakeSpeechSynthesizer initialized"
        );
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeSynthesizerConfig::default())
    }

    fn tone(&self, text: &str) -> AudioPayload {
        let millis = text.chars().count() as u64 * self.config.millis_per_char;
        let frames = (self.config.sample_rate as u64 * millis / 1000) as usize;
        let step = 2.0 * std::f32::consts::PI * 440.0 / self.config.sample_rate as f32;
        let samples: Vec<i16> = (0..frames)
            .map(|i| ((i as f32 * step).sin() * 2000.0) as i16)
            .collect();
        encode_pcm(&samples)
    }
}

#[async_trait]
impl SpeechSynthesizerPort for FakeSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError> {
        if is_blank(text) {
            return Ok(AudioPayload::empty());
        }

        tracing::debug!(text_len = text.len(), "FakeSpeechSynthesizer: generating tone");
        tokio::time::sleep(self.config.latency).await;
        Ok(self.tone(text))
    }

    fn voice(&self) -> &str {
        "fake"
    }
}
