//! Deck Commands - 卡组生成与清空

use crate::domain::StyleKind;

/// 从原文生成卡组
#[derive(Debug, Clone)]
pub struct GenerateDeck {
    pub source_text: String,
    pub style: StyleKind,
}

/// 清空当前卡组（Generate Next Set）
#[derive(Debug, Clone)]
pub struct StartOver;
