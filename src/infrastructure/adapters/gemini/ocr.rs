//! Gemini Image Text Extractor - 图片 OCR

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::Arc;

use super::client::GeminiClient;
use crate::application::ports::{ExtractError, SourceFile, TextExtractorPort};

const OCR_PROMPT: &str = "You are an expert at optical character recognition. Extract all \
visible text from this image. Preserve formatting like paragraphs where possible. If there is \
no text, return an empty string.";

pub(crate) fn request_body(file: &SourceFile) -> Value {
    json!({
        "contents": [{ "parts": [
            { "inlineData": { "mimeType": file.mime_type, "data": STANDARD.encode(&file.data) } },
            { "text": OCR_PROMPT }
        ]}]
    })
}

/// 图片文字识别
pub struct GeminiImageExtractor {
    client: Arc<GeminiClient>,
}

impl GeminiImageExtractor {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextExtractorPort for GeminiImageExtractor {
    fn supports(&self, mime_type: &str) -> bool {
        mime_type.starts_with("image/")
    }

    async fn extract_text(&self, file: &SourceFile) -> Result<String, ExtractError> {
        if !file.is_image() {
            return Err(ExtractError::UnsupportedType(file.mime_type.clone()));
        }

        let model = self.client.config().text_model.clone();
        let response = self
            .client
            .generate_content(&model, &request_body(file))
            .await?;

        Ok(response.text().trim().to_string())
    }
}
