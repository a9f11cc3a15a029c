//! History Command Handlers

use std::sync::Arc;

use crate::application::commands::{ClearHistory, LoadHistoryItem};
use crate::application::error::ApplicationError;
use crate::application::ports::{HistoryItem, HistoryStorePort};
use crate::application::viewer::{CardViewer, ViewerSnapshot};
use crate::domain::Deck;

/// 载入历史记录响应
#[derive(Debug, Clone)]
pub struct LoadHistoryItemResponse {
    pub item: HistoryItem,
    pub snapshot: ViewerSnapshot,
}

/// LoadHistoryItem Handler - 历史卡组替换当前卡组并重新预取语音
pub struct LoadHistoryItemHandler {
    history: Arc<dyn HistoryStorePort>,
    viewer: Arc<CardViewer>,
}

impl LoadHistoryItemHandler {
    pub fn new(history: Arc<dyn HistoryStorePort>, viewer: Arc<CardViewer>) -> Self {
        Self { history, viewer }
    }

    pub async fn handle(
        &self,
        cmd: LoadHistoryItem,
    ) -> Result<LoadHistoryItemResponse, ApplicationError> {
        let item = self
            .history
            .find(&cmd.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("History item", cmd.id.clone()))?;

        let deck = Deck::new(item.generation_type, item.cards.clone())?;
        let snapshot = self.viewer.load_deck(deck);

        tracing::info!(history_id = %item.id, cards = item.cards.len(), "History item loaded");

        Ok(LoadHistoryItemResponse { item, snapshot })
    }
}

/// ClearHistory Handler
pub struct ClearHistoryHandler {
    history: Arc<dyn HistoryStorePort>,
}

impl ClearHistoryHandler {
    pub fn new(history: Arc<dyn HistoryStorePort>) -> Self {
        Self { history }
    }

    pub async fn handle(&self, _cmd: ClearHistory) -> Result<(), ApplicationError> {
        self.history.clear().await?;
        tracing::info!("History cleared");
        Ok(())
    }
}
