//! Source Command Handlers

use std::sync::Arc;

use crate::application::commands::{ExtractText, ExtractTextResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::{ExtractError, TextExtractorPort};

/// ExtractText Handler - 按 MIME 类型选择提取器
pub struct ExtractTextHandler {
    extractors: Vec<Arc<dyn TextExtractorPort>>,
}

impl ExtractTextHandler {
    pub fn new(extractors: Vec<Arc<dyn TextExtractorPort>>) -> Self {
        Self { extractors }
    }

    pub async fn handle(&self, cmd: ExtractText) -> Result<ExtractTextResponse, ApplicationError> {
        let file = cmd.file;
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.supports(&file.mime_type))
            .ok_or_else(|| ExtractError::UnsupportedType(file.mime_type.clone()))?;

        let text = extractor.extract_text(&file).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ApplicationError::validation(
                "Could not extract any text from the file.",
            ));
        }

        tracing::info!(
            file_name = ?file.file_name,
            mime_type = %file.mime_type,
            bytes = file.data.len(),
            chars = text.chars().count(),
            "Source text extracted"
        );

        Ok(ExtractTextResponse {
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::SourceFile;
    use async_trait::async_trait;

    struct EchoImage;

    #[async_trait]
    impl TextExtractorPort for EchoImage {
        fn supports(&self, mime_type: &str) -> bool {
            mime_type.starts_with("image/")
        }

        async fn extract_text(&self, file: &SourceFile) -> Result<String, ExtractError> {
            Ok(format!("recognized {} bytes\n", file.data.len()))
        }
    }

    struct Utf8Text;

    #[async_trait]
    impl TextExtractorPort for Utf8Text {
        fn supports(&self, mime_type: &str) -> bool {
            mime_type == "text/plain"
        }

        async fn extract_text(&self, file: &SourceFile) -> Result<String, ExtractError> {
            String::from_utf8(file.data.clone())
                .map_err(|e| ExtractError::InvalidEncoding(e.to_string()))
        }
    }

    fn handler() -> ExtractTextHandler {
        ExtractTextHandler::new(vec![Arc::new(EchoImage), Arc::new(Utf8Text)])
    }

    #[tokio::test]
    async fn test_routes_by_mime_type() {
        let handler = handler();

        let image = handler
            .handle(ExtractText {
                file: SourceFile::new("image/png", vec![0; 4]),
            })
            .await
            .unwrap();
        assert_eq!(image.text, "recognized 4 bytes");

        let text = handler
            .handle(ExtractText {
                file: SourceFile::new("text/plain", b"  notes \n".to_vec()),
            })
            .await
            .unwrap();
        assert_eq!(text.text, "notes");
    }

    #[tokio::test]
    async fn test_unsupported_type_is_rejected() {
        let result = handler()
            .handle(ExtractText {
                file: SourceFile::new("application/pdf", vec![1, 2, 3]),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_empty_text_is_reported() {
        let result = handler()
            .handle(ExtractText {
                file: SourceFile::new("text/plain", b"   ".to_vec()),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(m)) if m.contains("Could not extract")));
    }
}
