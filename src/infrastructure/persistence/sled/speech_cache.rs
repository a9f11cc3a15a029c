//! Sled-based LRU Speech Cache Implementation

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::ports::{CacheError, CacheStats, SpeechCachePort};
use crate::domain::AudioPayload;

const ENTRY_PREFIX: &str = "speech:";

/// Sled 缓存配置
#[derive(Debug, Clone)]
pub struct SledCacheConfig {
    /// 数据库路径
    pub db_path: String,
    /// 最大缓存大小（字节）
    pub max_size_bytes: u64,
}

impl Default for SledCacheConfig {
    fn default() -> Self {
        Self {
            db_path: "data/speech.sled".to_string(),
            max_size_bytes: 256 * 1024 * 1024, // 256MB
        }
    }
}

/// 内部缓存条目
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpeechCacheEntry {
    payload: String,
    size_bytes: u64,
    last_accessed: i64,
    created_at: i64,
}

fn entry_key(cache_key: &str) -> String {
    format!("{}{}", ENTRY_PREFIX, cache_key)
}

fn db_err(e: sled::Error) -> CacheError {
    CacheError::DatabaseError(e.to_string())
}

/// Sled 语音缓存
pub struct SledSpeechCache {
    db: Db,
    max_size_bytes: u64,
    current_size: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl SledSpeechCache {
    /// 创建新的缓存实例
    pub fn new(config: &SledCacheConfig) -> Result<Self, CacheError> {
        let db = sled::open(&config.db_path).map_err(db_err)?;
        let current_size = Self::calculate_total_size(&db)?;

        tracing::info!(
            db_path = %config.db_path,
            max_size_bytes = config.max_size_bytes,
            current_size = current_size,
            "SledSpeechCache initialized"
        );

        Ok(Self {
            db,
            max_size_bytes: config.max_size_bytes,
            current_size: AtomicU64::new(current_size),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }

    /// 打开现有缓存
    pub fn open<P: AsRef<Path>>(path: P, max_size_bytes: u64) -> Result<Self, CacheError> {
        let config = SledCacheConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
            max_size_bytes,
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn calculate_total_size(db: &Db) -> Result<u64, CacheError> {
        let mut total = 0u64;
        for item in db.scan_prefix(ENTRY_PREFIX) {
            let (_, value) = item.map_err(db_err)?;
            if let Ok(entry) = bincode::deserialize::<SpeechCacheEntry>(&value) {
                total += entry.size_bytes;
            }
        }
        Ok(total)
    }

    /// LRU 淘汰一条，缓存为空时返回 false
    fn evict_lru(&self) -> Result<bool, CacheError> {
        let mut oldest: Option<(sled::IVec, SpeechCacheEntry)> = None;

        for item in self.db.scan_prefix(ENTRY_PREFIX) {
            let (key, value) = item.map_err(db_err)?;
            if let Ok(entry) = bincode::deserialize::<SpeechCacheEntry>(&value) {
                let is_older = oldest
                    .as_ref()
                    .map(|(_, e)| entry.last_accessed < e.last_accessed)
                    .unwrap_or(true);
                if is_older {
                    oldest = Some((key, entry));
                }
            }
        }

        let Some((key, entry)) = oldest else {
            return Ok(false);
        };

        let Some(removed) = self.db.remove(&key).map_err(db_err)? else {
            return Ok(true);
        };
        let removed_size = bincode::deserialize::<SpeechCacheEntry>(&removed)
            .map(|e| e.size_bytes)
            .unwrap_or(entry.size_bytes);
        self.current_size.fetch_sub(removed_size, Ordering::Relaxed);
        tracing::debug!(
            key = %String::from_utf8_lossy(&key),
            size_bytes = entry.size_bytes,
            "LRU evicted speech cache entry"
        );
        Ok(true)
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), CacheError> {
        self.db.flush().map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl SpeechCachePort for SledSpeechCache {
    async fn put(&self, cache_key: &str, payload: &AudioPayload) -> Result<(), CacheError> {
        let size = payload.len() as u64;
        if size > self.max_size_bytes {
            tracing::debug!(cache_key = %cache_key, size_bytes = size, "Payload exceeds cache size, skipped");
            return Ok(());
        }

        let key = entry_key(cache_key);
        // 覆盖旧条目时它的空间可复用
        let existing = self
            .db
            .get(&key)
            .map_err(db_err)?
            .and_then(|data| bincode::deserialize::<SpeechCacheEntry>(&data).ok())
            .map(|entry| entry.size_bytes)
            .unwrap_or(0);

        while self.current_size.load(Ordering::Relaxed) + size
            > self.max_size_bytes + existing
        {
            if !self.evict_lru()? {
                break;
            }
        }

        let now = Utc::now().timestamp_millis();
        let entry = SpeechCacheEntry {
            payload: payload.as_str().to_string(),
            size_bytes: size,
            last_accessed: now,
            created_at: now,
        };
        let entry_bytes =
            bincode::serialize(&entry).map_err(|e| CacheError::SerializationError(e.to_string()))?;

        // 以 insert 返回的旧值为准扣减，同一 key 的并发写入只计一次
        let previous = self.db.insert(&key, entry_bytes).map_err(db_err)?;
        self.current_size.fetch_add(size, Ordering::Relaxed);
        if let Some(entry) =
            previous.and_then(|data| bincode::deserialize::<SpeechCacheEntry>(&data).ok())
        {
            self.current_size.fetch_sub(entry.size_bytes, Ordering::Relaxed);
        }

        tracing::debug!(cache_key = %cache_key, size_bytes = size, "Speech cached");
        Ok(())
    }

    async fn get(&self, cache_key: &str) -> Result<Option<AudioPayload>, CacheError> {
        let key = entry_key(cache_key);

        match self.db.get(&key).map_err(db_err)? {
            Some(data) => {
                let mut entry: SpeechCacheEntry = bincode::deserialize(&data)
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;

                // LRU touch
                entry.last_accessed = Utc::now().timestamp_millis();
                let entry_bytes = bincode::serialize(&entry)
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;
                // 条目已被并发删除或覆盖时不回写
                let _ = self
                    .db
                    .compare_and_swap(&key, Some(&data), Some(entry_bytes))
                    .map_err(db_err)?;

                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Ok(Some(AudioPayload::from(entry.payload)))
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn remove(&self, cache_key: &str) -> Result<(), CacheError> {
        if let Some(data) = self.db.remove(entry_key(cache_key)).map_err(db_err)? {
            if let Ok(entry) = bincode::deserialize::<SpeechCacheEntry>(&data) {
                self.current_size.fetch_sub(entry.size_bytes, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.db.scan_prefix(ENTRY_PREFIX).count(),
            total_size_bytes: self.current_size.load(Ordering::Relaxed),
            max_size_bytes: self.max_size_bytes,
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }
}
