//! History Commands

/// 载入历史记录为当前卡组
#[derive(Debug, Clone)]
pub struct LoadHistoryItem {
    pub id: String,
}

/// 清空历史记录
#[derive(Debug, Clone)]
pub struct ClearHistory;
