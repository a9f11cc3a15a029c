//! History Queries

/// 列出历史记录（最新在前）
#[derive(Debug, Clone)]
pub struct ListHistory;
