//! Text Extractor Port - 源文本提取
//!
//! 图片走 OCR，纯文本文件直接读取

use async_trait::async_trait;
use thiserror::Error;

/// 提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}. Please upload an image or a .txt file.")]
    UnsupportedType(String),

    #[error("Invalid text encoding: {0}")]
    InvalidEncoding(String),

    #[error("Failed to extract text from the image: {0}")]
    RecognitionFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// 上传的源文件
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: Option<String>,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: None,
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_plain_text(&self) -> bool {
        self.mime_type == "text/plain" || self.mime_type.starts_with("text/plain;")
    }
}

/// Text Extractor Port
#[async_trait]
pub trait TextExtractorPort: Send + Sync {
    /// 是否能处理该 MIME 类型
    fn supports(&self, mime_type: &str) -> bool;

    /// 提取文本（去除首尾空白）
    async fn extract_text(&self, file: &SourceFile) -> Result<String, ExtractError>;
}
