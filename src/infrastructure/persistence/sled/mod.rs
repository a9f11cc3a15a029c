//! Sled Persistence - 嵌入式 KV 存储实现

mod speech_cache;

pub use speech_cache::{SledCacheConfig, SledSpeechCache};
