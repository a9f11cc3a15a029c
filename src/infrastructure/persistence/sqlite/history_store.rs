//! SQLite History Store
//!
//! 卡片内容以 JSON 存储在 cards 列，顺序由 seq 决定（最近保存的在前）。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{HistoryError, HistoryItem, HistoryStorePort, HISTORY_LIMIT};
use crate::domain::{CardContent, StyleKind};

/// SQLite History Store
pub struct SqliteHistoryStore {
    pool: DbPool,
    max_items: usize,
}

impl SqliteHistoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self::with_limit(pool, HISTORY_LIMIT)
    }

    pub fn with_limit(pool: DbPool, max_items: usize) -> Self {
        Self {
            pool,
            max_items: max_items.max(1),
        }
    }
}

#[derive(FromRow)]
struct HistoryRow {
    id: String,
    timestamp: String,
    source_text: String,
    cards: String,
    generation_type: String,
}

impl TryFrom<HistoryRow> for HistoryItem {
    type Error = HistoryError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let cards: Vec<CardContent> = serde_json::from_str(&row.cards)
            .map_err(|e| HistoryError::SerializationError(e.to_string()))?;
        let generation_type = StyleKind::from_str(&row.generation_type).ok_or_else(|| {
            HistoryError::SerializationError(format!(
                "Unknown generation type: {}",
                row.generation_type
            ))
        })?;

        Ok(HistoryItem {
            id: row.id,
            timestamp: DateTime::parse_from_rfc3339(&row.timestamp)
                .map_err(|e| HistoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
            source_text: row.source_text,
            cards,
            generation_type,
        })
    }
}

fn db_err(e: sqlx::Error) -> HistoryError {
    HistoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl HistoryStorePort for SqliteHistoryStore {
    async fn load(&self) -> Result<Vec<HistoryItem>, HistoryError> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            "SELECT id, timestamp, source_text, cards, generation_type FROM history_items ORDER BY seq DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(HistoryItem::try_from).collect()
    }

    async fn save(&self, item: HistoryItem) -> Result<Vec<HistoryItem>, HistoryError> {
        let cards = serde_json::to_string(&item.cards)
            .map_err(|e| HistoryError::SerializationError(e.to_string()))?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // 同 ID 重新保存时移到最前
        sqlx::query("DELETE FROM history_items WHERE id = ?")
            .bind(&item.id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO history_items (id, timestamp, source_text, cards, generation_type)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(item.timestamp.to_rfc3339())
        .bind(&item.source_text)
        .bind(cards)
        .bind(item.generation_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let trimmed = sqlx::query(
            r#"
            DELETE FROM history_items WHERE seq NOT IN (
                SELECT seq FROM history_items ORDER BY seq DESC LIMIT ?
            )
            "#,
        )
        .bind(self.max_items as i64)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?
        .rows_affected();

        tx.commit().await.map_err(db_err)?;

        tracing::debug!(id = %item.id, cards = item.cards.len(), trimmed, "History item saved");
        self.load().await
    }

    async fn find(&self, id: &str) -> Result<Option<HistoryItem>, HistoryError> {
        let row: Option<HistoryRow> = sqlx::query_as(
            "SELECT id, timestamp, source_text, cards, generation_type FROM history_items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(HistoryItem::try_from).transpose()
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        let removed = sqlx::query("DELETE FROM history_items")
            .execute(&self.pool)
            .await
            .map_err(db_err)?
            .rows_affected();

        tracing::info!(removed, "History cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn store(max_items: usize) -> SqliteHistoryStore {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteHistoryStore::with_limit(pool, max_items)
    }

    fn item(id: &str, style: StyleKind) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            timestamp: Utc::now(),
            source_text: format!("source of {id}"),
            cards: vec![CardContent::new("TOPIC||summary", "• a\n• b", style)],
            generation_type: style,
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = store(50).await;
        let saved = item("hist-1", StyleKind::Concept);

        let items = store.save(saved.clone()).await.unwrap();
        assert_eq!(items.len(), 1);

        let found = store.find("hist-1").await.unwrap().unwrap();
        assert_eq!(found.cards, saved.cards);
        assert_eq!(found.generation_type, StyleKind::Concept);
        assert_eq!(found.timestamp.timestamp_millis(), saved.timestamp.timestamp_millis());
        assert!(store.find("hist-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_newest_first_and_trimmed() {
        let store = store(2).await;
        store.save(item("hist-1", StyleKind::Qa)).await.unwrap();
        store.save(item("hist-2", StyleKind::Qa)).await.unwrap();
        let items = store.save(item("hist-3", StyleKind::Qa)).await.unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["hist-3", "hist-2"]);
    }

    #[tokio::test]
    async fn test_resave_moves_to_front() {
        let store = store(50).await;
        store.save(item("hist-1", StyleKind::Qa)).await.unwrap();
        store.save(item("hist-2", StyleKind::Qa)).await.unwrap();
        let items = store.save(item("hist-1", StyleKind::Qa)).await.unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["hist-1", "hist-2"]);
    }

    #[tokio::test]
    async fn test_back_to_back_generations_both_kept() {
        let store = store(50).await;
        let first = HistoryItem::new("first".to_string(), Vec::new(), StyleKind::Qa);
        let second = HistoryItem::new("second".to_string(), Vec::new(), StyleKind::Qa);

        store.save(first.clone()).await.unwrap();
        let items = store.save(second.clone()).await.unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = store(50).await;
        store.save(item("hist-1", StyleKind::Qa)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }
}
