//! Cached Speech Synthesizer - 合成结果缓存装饰器
//!
//! 以 md5(text) + voice 为 key 查询语音缓存，未命中时调用内层合成器并写回。
//! 缓存读写失败只记录日志，不影响合成结果。

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::ports::{
    generate_cache_key, is_blank, SpeechCachePort, SpeechSynthesizerPort, SynthesisError,
};
use crate::domain::AudioPayload;

pub struct CachedSpeechSynthesizer {
    inner: Arc<dyn SpeechSynthesizerPort>,
    cache: Arc<dyn SpeechCachePort>,
}

impl CachedSpeechSynthesizer {
    pub fn new(inner: Arc<dyn SpeechSynthesizerPort>, cache: Arc<dyn SpeechCachePort>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl SpeechSynthesizerPort for CachedSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError> {
        if is_blank(text) {
            return self.inner.synthesize(text).await;
        }

        let cache_key = generate_cache_key(text, self.inner.voice());
        match self.cache.get(&cache_key).await {
            Ok(Some(payload)) => {
                tracing::debug!(cache_key = %cache_key, "Speech cache hit");
                return Ok(payload);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(cache_key = %cache_key, error = %e, "Speech cache lookup failed"),
        }

        let payload = self.inner.synthesize(text).await?;
        if !payload.is_empty() {
            if let Err(e) = self.cache.put(&cache_key, &payload).await {
                tracing::error!(cache_key = %cache_key, error = %e, "Failed to cache speech");
            }
        }
        Ok(payload)
    }

    fn voice(&self) -> &str {
        self.inner.voice()
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }
}
