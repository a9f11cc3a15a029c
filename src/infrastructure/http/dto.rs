//! Data Transfer Objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{HistoryItem, HistorySummary, ViewerSnapshot};
use crate::domain::{CardContent, Side, StyleKind};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// Source DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ExtractTextResponse {
    pub text: String,
}

// ============================================================================
// Deck DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateDeckRequest {
    pub text: String,
    /// `qa` | `concepts`，缺省为 `qa`
    #[serde(default)]
    pub style: Option<String>,
}

impl GenerateDeckRequest {
    pub fn style(&self) -> Option<StyleKind> {
        match self.style.as_deref() {
            None | Some("") => Some(StyleKind::default()),
            Some(s) => StyleKind::from_str(s),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateDeckResponse {
    pub viewer: ViewerSnapshot,
    pub history_saved: bool,
}

#[derive(Debug, Serialize)]
pub struct StartOverResponse {
    pub cleared: bool,
}

// ============================================================================
// Viewer DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GoToRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub side: Side,
}

#[derive(Debug, Deserialize)]
pub struct AutoReadRequest {
    pub enabled: bool,
}

// ============================================================================
// History DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoadHistoryRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct HistorySummaryResponse {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub preview: String,
    pub total_cards: usize,
    pub generation_type: StyleKind,
}

impl From<HistorySummary> for HistorySummaryResponse {
    fn from(summary: HistorySummary) -> Self {
        Self {
            id: summary.id,
            timestamp: summary.timestamp,
            preview: summary.preview,
            total_cards: summary.total_cards,
            generation_type: summary.generation_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryItemResponse {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source_text: String,
    pub cards: Vec<CardContent>,
    pub generation_type: StyleKind,
}

impl From<HistoryItem> for HistoryItemResponse {
    fn from(item: HistoryItem) -> Self {
        Self {
            id: item.id,
            timestamp: item.timestamp,
            source_text: item.source_text,
            cards: item.cards,
            generation_type: item.generation_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoadHistoryResponse {
    pub item: HistoryItemResponse,
    pub viewer: ViewerSnapshot,
}
