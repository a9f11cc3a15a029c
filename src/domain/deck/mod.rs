//! Deck Context - 卡组限界上下文
//!
//! 职责:
//! - 卡组聚合（生成后长度固定、顺序不可变）
//! - 卡片实体（文本不可变，语音载荷只允许写入一次）
//! - 概念卡正面文本 "TOPIC||summary" 的解析

mod aggregate;
mod concept;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::Deck;
pub use concept::{split_concept, to_speech_text, CONCEPT_DELIMITER};
pub use entities::{Card, CardContent};
pub use errors::DeckError;
pub use value_objects::{AudioPayload, DeckId, Side, StyleKind};
