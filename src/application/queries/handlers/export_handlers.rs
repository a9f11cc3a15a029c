//! Export Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::export::ExportFormat;
use crate::application::queries::ExportDeck;
use crate::application::viewer::CardViewer;

/// 导出结果
#[derive(Debug, Clone)]
pub struct ExportDeckResponse {
    pub format: ExportFormat,
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// ExportDeck Handler
pub struct ExportDeckHandler {
    viewer: Arc<CardViewer>,
}

impl ExportDeckHandler {
    pub fn new(viewer: Arc<CardViewer>) -> Self {
        Self { viewer }
    }

    pub async fn handle(&self, query: ExportDeck) -> Result<ExportDeckResponse, ApplicationError> {
        let deck = self.viewer.deck().ok_or_else(ApplicationError::no_deck)?;
        let bytes = query.format.render(&deck.contents());

        tracing::info!(
            deck_id = %deck.id(),
            format = ?query.format,
            bytes = bytes.len(),
            "Deck exported"
        );

        Ok(ExportDeckResponse {
            format: query.format,
            file_name: query.format.file_name(),
            content_type: query.format.content_type(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::audio::ControllerConfig;
    use crate::application::testing::{ManualEngine, ScriptedSynthesizer};
    use crate::domain::{CardContent, Deck, StyleKind};
    use crate::infrastructure::events::EventPublisher;

    fn viewer() -> Arc<CardViewer> {
        Arc::new(CardViewer::new(
            Arc::new(ScriptedSynthesizer::new()),
            Arc::new(ManualEngine::new()),
            Arc::new(EventPublisher::new()),
            ControllerConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_export_requires_deck() {
        let result = ExportDeckHandler::new(viewer())
            .handle(ExportDeck {
                format: ExportFormat::Text,
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_export_text_and_pdf() {
        let viewer = viewer();
        viewer.load_deck(
            Deck::new(
                StyleKind::Qa,
                vec![CardContent::new("What is 2 + 2?", "4", StyleKind::Qa)],
            )
            .unwrap(),
        );
        let handler = ExportDeckHandler::new(viewer);

        let text = handler
            .handle(ExportDeck {
                format: ExportFormat::Text,
            })
            .await
            .unwrap();
        assert_eq!(text.file_name, "flashcards.txt");
        assert!(String::from_utf8(text.bytes)
            .unwrap()
            .contains("1. Question: What is 2 + 2?"));

        let pdf = handler
            .handle(ExportDeck {
                format: ExportFormat::Pdf,
            })
            .await
            .unwrap();
        assert_eq!(pdf.content_type, "application/pdf");
        assert!(pdf.bytes.starts_with(b"%PDF-1.4"));
    }
}
