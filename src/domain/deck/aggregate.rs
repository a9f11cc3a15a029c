//! Deck Context - Aggregate Root

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::{Card, CardContent, DeckError, DeckId, Side, StyleKind};

/// Deck 聚合根
///
/// 不变量:
/// - 至少包含一张卡片
/// - 生成后长度固定，卡片不会被重排或删除
/// - 卡片只允许挂载语音载荷
#[derive(Debug)]
pub struct Deck {
    id: DeckId,
    style: StyleKind,
    cards: Vec<Arc<Card>>,
    created_at: DateTime<Utc>,
}

impl Deck {
    /// 由生成结果创建卡组
    pub fn new(style: StyleKind, contents: Vec<CardContent>) -> Result<Self, DeckError> {
        if contents.is_empty() {
            return Err(DeckError::Empty);
        }

        Ok(Self {
            id: DeckId::new(),
            style,
            cards: contents.into_iter().map(|c| Arc::new(Card::new(c))).collect(),
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> DeckId {
        self.id
    }

    pub fn style(&self) -> StyleKind {
        self.style
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Arc<Card>] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Result<&Arc<Card>, DeckError> {
        self.cards.get(index).ok_or(DeckError::IndexOutOfRange {
            index,
            len: self.cards.len(),
        })
    }

    /// 卡片文本快照（用于历史记录与导出）
    pub fn contents(&self) -> Vec<CardContent> {
        self.cards.iter().map(|c| c.content().clone()).collect()
    }

    /// 已就绪语音的面数
    pub fn audio_ready_count(&self) -> usize {
        self.cards
            .iter()
            .map(|c| c.has_audio(Side::Front) as usize + c.has_audio(Side::Back) as usize)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AudioPayload;

    fn contents(n: usize) -> Vec<CardContent> {
        (0..n)
            .map(|i| CardContent::new(format!("Q{}", i), format!("A{}", i), StyleKind::Qa))
            .collect()
    }

    #[test]
    fn test_empty_deck_rejected() {
        assert!(matches!(
            Deck::new(StyleKind::Qa, Vec::new()),
            Err(DeckError::Empty)
        ));
    }

    #[test]
    fn test_card_lookup_and_bounds() {
        let deck = Deck::new(StyleKind::Qa, contents(3)).unwrap();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.card(2).unwrap().text(Side::Front), "Q2");
        assert!(matches!(
            deck.card(3),
            Err(DeckError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_audio_ready_count() {
        let deck = Deck::new(StyleKind::Qa, contents(2)).unwrap();
        assert_eq!(deck.audio_ready_count(), 0);
        deck.card(0)
            .unwrap()
            .attach_audio(Side::Back, AudioPayload::from("AAAA"));
        assert_eq!(deck.audio_ready_count(), 1);
        assert_eq!(deck.contents(), contents(2));
    }
}
