//! Export - 卡组导出（纯文本、PDF）

mod pdf;
mod text;

use serde::{Deserialize, Serialize};

use crate::domain::CardContent;

pub use pdf::{to_pdf, PDF_TITLE};
pub use text::{to_plain_text, TEXT_HEADER};

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Text,
    Pdf,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Text => "flashcards.txt",
            ExportFormat::Pdf => "flashcards.pdf",
        }
    }

    pub fn render(&self, cards: &[CardContent]) -> Vec<u8> {
        match self {
            ExportFormat::Text => to_plain_text(cards).into_bytes(),
            ExportFormat::Pdf => to_pdf(cards),
        }
    }
}
