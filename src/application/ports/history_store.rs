//! History Store Port - 生成历史持久化
//!
//! 最近生成的卡组（不含语音）按时间倒序保存，最多保留 `HISTORY_LIMIT` 条

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{CardContent, StyleKind};

/// 历史记录默认上限
pub const HISTORY_LIMIT: usize = 50;

/// History Store 错误
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History item not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 历史记录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// `hist-<毫秒时间戳>-<随机后缀>`，同一毫秒内的两次生成也不会冲突
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source_text: String,
    pub cards: Vec<CardContent>,
    pub generation_type: StyleKind,
}

impl HistoryItem {
    pub fn new(source_text: String, cards: Vec<CardContent>, generation_type: StyleKind) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!(
                "hist-{}-{}",
                timestamp.timestamp_millis(),
                &Uuid::new_v4().simple().to_string()[..8]
            ),
            timestamp,
            source_text,
            cards,
            generation_type,
        }
    }
}

/// History Store Port
#[async_trait]
pub trait HistoryStorePort: Send + Sync {
    /// 加载全部历史（最新在前）
    async fn load(&self) -> Result<Vec<HistoryItem>, HistoryError>;

    /// 插入到最前并裁剪到上限，返回更新后的列表
    async fn save(&self, item: HistoryItem) -> Result<Vec<HistoryItem>, HistoryError>;

    /// 按 ID 查找
    async fn find(&self, id: &str) -> Result<Option<HistoryItem>, HistoryError>;

    /// 清空历史
    async fn clear(&self) -> Result<(), HistoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let items: Vec<HistoryItem> = (0..64)
            .map(|_| HistoryItem::new("text".to_string(), Vec::new(), StyleKind::Qa))
            .collect();

        let mut ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), items.len());
        let prefix = format!("hist-{}-", items[0].timestamp.timestamp_millis());
        assert!(items[0].id.starts_with(&prefix));
    }
}
