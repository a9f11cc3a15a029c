//! Export Queries

use crate::application::export::ExportFormat;

/// 导出当前卡组
#[derive(Debug, Clone)]
pub struct ExportDeck {
    pub format: ExportFormat,
}
