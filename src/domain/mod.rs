//! Domain Layer - 领域层
//!
//! 限界上下文:
//! - Deck Context: 闪卡卡组（卡片、正反面、语音载荷）

pub mod deck;

pub use deck::{
    split_concept, to_speech_text, AudioPayload, Card, CardContent, Deck, DeckError, DeckId,
    Side, StyleKind, CONCEPT_DELIMITER,
};
