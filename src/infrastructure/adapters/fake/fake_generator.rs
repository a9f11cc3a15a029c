//! Fake Flashcard Generator - 离线模式的卡片生成
//!
//! 按句子切分原文：问答卡以 "What does the text say about ...?" 为问题，
//! 概念卡取句首词作为主题。

use async_trait::async_trait;

use crate::application::ports::{FlashcardGeneratorPort, GenerationError};
use crate::domain::{CardContent, StyleKind, CONCEPT_DELIMITER};

const MAX_CARDS: usize = 10;

fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| s.split_whitespace().count() >= 3)
        .take(MAX_CARDS)
        .collect()
}

fn subject(sentence: &str) -> String {
    sentence
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fake Flashcard Generator
#[derive(Debug, Default)]
pub struct FakeFlashcardGenerator;

impl FakeFlashcardGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FlashcardGeneratorPort for FakeFlashcardGenerator {
    async fn generate(
        &self,
        source_text: &str,
        style: StyleKind,
    ) -> Result<Vec<CardContent>, GenerationError> {
        let cards: Vec<CardContent> = sentences(source_text)
            .into_iter()
            .map(|sentence| match style {
                StyleKind::Qa => CardContent::new(
                    format!("What does the text say about \"{}\"?", subject(sentence)),
                    format!("{sentence}."),
                    StyleKind::Qa,
                ),
                StyleKind::Concept => {
                    let words: Vec<&str> = sentence.split_whitespace().collect();
                    let summary: String = words.iter().take(12).copied().collect::<Vec<_>>().join(" ");
                    let details = words
                        .chunks(6)
                        .map(|chunk| format!("• {}", chunk.join(" ")))
                        .collect::<Vec<_>>()
                        .join("\n");
                    CardContent::new(
                        format!(
                            "{}{}{}",
                            subject(sentence).to_uppercase(),
                            CONCEPT_DELIMITER,
                            summary
                        ),
                        details,
                        StyleKind::Concept,
                    )
                }
            })
            .collect();

        if cards.is_empty() {
            return Err(GenerationError::Empty);
        }

        tracing::debug!(style = %style, cards = cards.len(), "FakeFlashcardGenerator: cards built");
        Ok(cards)
    }
}
