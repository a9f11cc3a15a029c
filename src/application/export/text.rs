//! 纯文本导出

use crate::domain::{split_concept, CardContent, StyleKind};

pub const TEXT_HEADER: &str = "QuickFlash AI - Flashcards";

/// 导出为纯文本
///
/// 每张卡片编号输出；概念卡拆分为 `Concept:` 和 `Summary:` 两行。
pub fn to_plain_text(cards: &[CardContent]) -> String {
    let mut content = format!("{TEXT_HEADER}\n\n");

    for (index, card) in cards.iter().enumerate() {
        let front = match split_concept(&card.front_text) {
            Some((topic, summary)) if card.style == StyleKind::Concept => {
                format!("Concept: {topic}\n   Summary: {summary}")
            }
            _ => format!("Question: {}", card.front_text),
        };
        content.push_str(&format!("{}. {}\n", index + 1, front));
        content.push_str(&format!("   Answer: {}\n\n", card.back_text));
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qa_cards() {
        let cards = vec![
            CardContent::new("What is 2 + 2?", "4", StyleKind::Qa),
            CardContent::new("Capital of France?", "Paris", StyleKind::Qa),
        ];
        assert_eq!(
            to_plain_text(&cards),
            "QuickFlash AI - Flashcards\n\n\
             1. Question: What is 2 + 2?\n   Answer: 4\n\n\
             2. Question: Capital of France?\n   Answer: Paris\n\n"
        );
    }

    #[test]
    fn test_concept_card_splits_topic_and_summary() {
        let cards = vec![CardContent::new(
            "OSMOSIS||Water crosses a membrane",
            "• Passive\n• Needs a gradient",
            StyleKind::Concept,
        )];
        assert_eq!(
            to_plain_text(&cards),
            "QuickFlash AI - Flashcards\n\n\
             1. Concept: OSMOSIS\n   Summary: Water crosses a membrane\n\
             \x20  Answer: • Passive\n• Needs a gradient\n\n"
        );
    }

    #[test]
    fn test_concept_without_delimiter_is_a_question() {
        let cards = vec![CardContent::new("Just a topic", "details", StyleKind::Concept)];
        assert!(to_plain_text(&cards).contains("1. Question: Just a topic\n"));
    }

    #[test]
    fn test_empty_deck_is_header_only() {
        assert_eq!(to_plain_text(&[]), "QuickFlash AI - Flashcards\n\n");
    }
}
