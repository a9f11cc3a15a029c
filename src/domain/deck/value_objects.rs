//! Deck Context - Value Objects

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// 卡组唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckId(Uuid);

impl DeckId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DeckId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 卡片的一面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 正面（问题 / 概念）
    Front,
    /// 反面（答案 / 细节）
    Back,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }

    pub fn other(&self) -> Side {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 卡片生成风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StyleKind {
    /// 问答卡
    #[default]
    #[serde(rename = "qa")]
    Qa,
    /// 概念卡：正面 "TOPIC||summary"，反面为要点列表
    #[serde(rename = "concepts", alias = "concept")]
    Concept,
}

impl StyleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleKind::Qa => "qa",
            StyleKind::Concept => "concepts",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "qa" => Some(StyleKind::Qa),
            "concepts" | "concept" => Some(StyleKind::Concept),
            _ => None,
        }
    }
}

impl std::fmt::Display for StyleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 语音载荷
///
/// TTS 服务返回的传输编码（base64）音频，内容为无文件头的 16-bit PCM。
/// 克隆只增加引用计数。
#[derive(Clone, PartialEq, Eq)]
pub struct AudioPayload(Arc<str>);

impl AudioPayload {
    pub fn new(encoded: impl Into<Arc<str>>) -> Self {
        Self(encoded.into())
    }

    /// 空载荷（空白文本的合成结果）
    pub fn empty() -> Self {
        Self(Arc::from(""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for AudioPayload {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<&str> for AudioPayload {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Debug for AudioPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AudioPayload({} bytes)", self.0.len())
    }
}
