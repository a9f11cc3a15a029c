//! Persistence Layer - 数据持久化
//!
//! SQLite（生成历史）和 Sled（语音缓存）存储实现

pub mod sled;
pub mod sqlite;

pub use self::sled::{SledCacheConfig, SledSpeechCache};
pub use self::sqlite::{create_pool, run_migrations, DatabaseConfig, DbPool, SqliteHistoryStore};
