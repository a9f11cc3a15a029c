//! Deck Context - Entities

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::{to_speech_text, AudioPayload, Side, StyleKind};

/// 卡片文本内容（不含语音）
///
/// 生成服务的输出与历史记录都使用这一形态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    pub front_text: String,
    pub back_text: String,
    pub style: StyleKind,
}

impl CardContent {
    pub fn new(
        front_text: impl Into<String>,
        back_text: impl Into<String>,
        style: StyleKind,
    ) -> Self {
        Self {
            front_text: front_text.into(),
            back_text: back_text.into(),
            style,
        }
    }
}

/// 卡片实体
///
/// 不变量:
/// - 文本和风格在创建后不可变
/// - 每一面的语音载荷最多写入一次，写入后不会被清空或替换
///
/// 卡片通过 `Arc<Card>` 在卡组、预取调度器和播放控制器之间共享。
/// 旧卡组被替换后，仍在运行的预取只会写入已脱离展示的旧卡片。
#[derive(Debug)]
pub struct Card {
    content: CardContent,
    front_audio: OnceLock<AudioPayload>,
    back_audio: OnceLock<AudioPayload>,
}

impl Card {
    pub fn new(content: CardContent) -> Self {
        Self {
            content,
            front_audio: OnceLock::new(),
            back_audio: OnceLock::new(),
        }
    }

    pub fn content(&self) -> &CardContent {
        &self.content
    }

    pub fn style(&self) -> StyleKind {
        self.content.style
    }

    pub fn text(&self, side: Side) -> &str {
        match side {
            Side::Front => &self.content.front_text,
            Side::Back => &self.content.back_text,
        }
    }

    /// 送往 TTS 的文本（去掉概念卡分隔符）
    pub fn speech_text(&self, side: Side) -> String {
        to_speech_text(self.text(side))
    }

    fn slot(&self, side: Side) -> &OnceLock<AudioPayload> {
        match side {
            Side::Front => &self.front_audio,
            Side::Back => &self.back_audio,
        }
    }

    pub fn audio(&self, side: Side) -> Option<&AudioPayload> {
        self.slot(side).get()
    }

    pub fn has_audio(&self, side: Side) -> bool {
        self.audio(side).is_some()
    }

    /// 挂载语音载荷
    ///
    /// 返回 true 表示本次写入生效；已有载荷或载荷为空时返回 false，原值保持不变。
    pub fn attach_audio(&self, side: Side, payload: AudioPayload) -> bool {
        if payload.is_empty() {
            return false;
        }
        self.slot(side).set(payload).is_ok()
    }
}

impl From<CardContent> for Card {
    fn from(content: CardContent) -> Self {
        Self::new(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qa_card() -> Card {
        Card::new(CardContent::new("What is Rust?", "A language", StyleKind::Qa))
    }

    #[test]
    fn test_attach_audio_is_write_once() {
        let card = qa_card();
        assert!(!card.has_audio(Side::Front));

        assert!(card.attach_audio(Side::Front, AudioPayload::from("first")));
        assert!(!card.attach_audio(Side::Front, AudioPayload::from("second")));
        assert_eq!(card.audio(Side::Front).unwrap().as_str(), "first");
        assert!(!card.has_audio(Side::Back));
    }

    #[test]
    fn test_empty_payload_is_not_attached() {
        let card = qa_card();
        assert!(!card.attach_audio(Side::Back, AudioPayload::empty()));
        assert!(card.audio(Side::Back).is_none());
    }

    #[test]
    fn test_speech_text_for_concept_front() {
        let card = Card::new(CardContent::new(
            "OSMOSIS||Water moves across membranes",
            "• Passive\n• Needs a gradient",
            StyleKind::Concept,
        ));
        assert_eq!(
            card.speech_text(Side::Front),
            "OSMOSIS\nWater moves across membranes"
        );
        assert_eq!(card.text(Side::Back), "• Passive\n• Needs a gradient");
    }
}
