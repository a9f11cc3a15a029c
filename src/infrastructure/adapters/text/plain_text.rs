//! Plain Text Extractor - `text/plain` 文件直接读取

use async_trait::async_trait;

use crate::application::ports::{ExtractError, SourceFile, TextExtractorPort};

/// 纯文本读取（UTF-8，允许 BOM）
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractorPort for PlainTextExtractor {
    fn supports(&self, mime_type: &str) -> bool {
        mime_type == "text/plain" || mime_type.starts_with("text/plain;")
    }

    async fn extract_text(&self, file: &SourceFile) -> Result<String, ExtractError> {
        if !file.is_plain_text() {
            return Err(ExtractError::UnsupportedType(file.mime_type.clone()));
        }

        let data = file.data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&file.data);
        let text =
            std::str::from_utf8(data).map_err(|e| ExtractError::InvalidEncoding(e.to_string()))?;
        Ok(text.trim().to_string())
    }
}
