//! History Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{HistoryItem, HistoryStorePort};
use crate::application::queries::ListHistory;
use crate::domain::StyleKind;

/// 历史记录摘要
#[derive(Debug, Clone)]
pub struct HistorySummary {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// 原文前 100 个字符
    pub preview: String,
    pub total_cards: usize,
    pub generation_type: StyleKind,
}

const PREVIEW_CHARS: usize = 100;

impl From<&HistoryItem> for HistorySummary {
    fn from(item: &HistoryItem) -> Self {
        let mut preview: String = item.source_text.chars().take(PREVIEW_CHARS).collect();
        if item.source_text.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        Self {
            id: item.id.clone(),
            timestamp: item.timestamp,
            preview,
            total_cards: item.cards.len(),
            generation_type: item.generation_type,
        }
    }
}

/// ListHistory Handler
pub struct ListHistoryHandler {
    history: Arc<dyn HistoryStorePort>,
}

impl ListHistoryHandler {
    pub fn new(history: Arc<dyn HistoryStorePort>) -> Self {
        Self { history }
    }

    pub async fn handle(&self, _query: ListHistory) -> Result<Vec<HistorySummary>, ApplicationError> {
        let items = self.history.load().await?;
        Ok(items.iter().map(HistorySummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryHistory;
    use crate::domain::CardContent;

    #[tokio::test]
    async fn test_lists_newest_first_with_preview() {
        let history = Arc::new(MemoryHistory::new());
        let mut first = HistoryItem::new(
            "a".repeat(150),
            vec![CardContent::new("Q", "A", StyleKind::Qa)],
            StyleKind::Qa,
        );
        first.id = "hist-1".to_string();
        let mut second = HistoryItem::new("short".to_string(), Vec::new(), StyleKind::Concept);
        second.id = "hist-2".to_string();
        history.save(first).await.unwrap();
        history.save(second).await.unwrap();

        let summaries = ListHistoryHandler::new(history)
            .handle(ListHistory)
            .await
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, "hist-2");
        assert_eq!(summaries[0].preview, "short");
        assert_eq!(summaries[1].preview.chars().count(), 103);
        assert_eq!(summaries[1].total_cards, 1);
    }
}
