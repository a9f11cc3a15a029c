//! Deck Command Handlers

use std::sync::Arc;

use crate::application::commands::{GenerateDeck, StartOver};
use crate::application::error::ApplicationError;
use crate::application::ports::{FlashcardGeneratorPort, HistoryItem, HistoryStorePort};
use crate::application::viewer::{CardViewer, ViewerSnapshot};
use crate::domain::{Deck, DeckId};

/// 生成卡组响应
#[derive(Debug, Clone)]
pub struct GenerateDeckResponse {
    pub snapshot: ViewerSnapshot,
    /// 保存后的历史列表；保存失败时为 None
    pub history: Option<Vec<HistoryItem>>,
}

/// GenerateDeck Handler
///
/// 清空当前卡组 → 调用生成服务 → 载入新卡组并启动预取 → 写入历史
pub struct GenerateDeckHandler {
    generator: Arc<dyn FlashcardGeneratorPort>,
    history: Arc<dyn HistoryStorePort>,
    viewer: Arc<CardViewer>,
}

impl GenerateDeckHandler {
    pub fn new(
        generator: Arc<dyn FlashcardGeneratorPort>,
        history: Arc<dyn HistoryStorePort>,
        viewer: Arc<CardViewer>,
    ) -> Self {
        Self {
            generator,
            history,
            viewer,
        }
    }

    pub async fn handle(&self, cmd: GenerateDeck) -> Result<GenerateDeckResponse, ApplicationError> {
        let source_text = cmd.source_text.trim();
        if source_text.is_empty() {
            return Err(ApplicationError::validation(
                "Please enter some text or upload a file to generate flashcards.",
            ));
        }

        self.viewer.clear();

        let cards = self.generator.generate(source_text, cmd.style).await?;
        let deck = Deck::new(cmd.style, cards)?;
        let contents = deck.contents();

        tracing::info!(
            deck_id = %deck.id(),
            style = %cmd.style,
            cards = deck.len(),
            source_chars = source_text.chars().count(),
            "Flashcards generated"
        );

        let snapshot = self.viewer.load_deck(deck);

        let item = HistoryItem::new(cmd.source_text, contents, cmd.style);
        let history = match self.history.save(item).await {
            Ok(history) => Some(history),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save generation history");
                None
            }
        };

        Ok(GenerateDeckResponse { snapshot, history })
    }
}

/// StartOver Handler
pub struct StartOverHandler {
    viewer: Arc<CardViewer>,
}

impl StartOverHandler {
    pub fn new(viewer: Arc<CardViewer>) -> Self {
        Self { viewer }
    }

    pub async fn handle(&self, _cmd: StartOver) -> Result<Option<DeckId>, ApplicationError> {
        Ok(self.viewer.clear())
    }
}
