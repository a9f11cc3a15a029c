//! Speech Cache Port - 合成语音缓存
//!
//! 定义语音缓存的抽象接口，具体实现使用 Sled (LRU 缓存)

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AudioPayload;

/// Speech Cache 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Speech Cache Port
///
/// 基于 md5(text) + voice 的 LRU 缓存
#[async_trait]
pub trait SpeechCachePort: Send + Sync {
    /// 存储语音载荷
    ///
    /// 自动执行 LRU 淘汰以保持缓存大小在限制内
    async fn put(&self, cache_key: &str, payload: &AudioPayload) -> Result<(), CacheError>;

    /// 根据缓存 key 获取载荷，同时更新 last_accessed（LRU touch）
    async fn get(&self, cache_key: &str) -> Result<Option<AudioPayload>, CacheError>;

    /// 删除缓存条目
    async fn remove(&self, cache_key: &str) -> Result<(), CacheError>;

    /// 获取缓存统计信息
    async fn stats(&self) -> CacheStats;
}

/// 缓存统计信息
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_size_bytes: u64,
    pub max_size_bytes: u64,
    pub hit_count: u64,
    pub miss_count: u64,
}

/// 生成缓存 key
///
/// 使用 md5(text) + voice 作为缓存 key
pub fn generate_cache_key(text: &str, voice: &str) -> String {
    let digest = md5::compute(text.as_bytes());
    format!("{:x}:{}", digest, voice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_depends_on_text_and_voice() {
        let a = generate_cache_key("hello", "Kore");
        assert_eq!(a, "5d41402abc4b2a76b9719d911017c592:Kore");
        assert_ne!(a, generate_cache_key("hello", "Puck"));
        assert_ne!(a, generate_cache_key("hello!", "Kore"));
    }
}
