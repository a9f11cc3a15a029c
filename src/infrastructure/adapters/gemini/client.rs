//! Gemini Client - generateContent REST 调用
//!
//! POST {base_url}/v1beta/models/{model}:generateContent
//! Header: x-goog-api-key
//! 文本生成、语音合成和图片识别共用同一个端点，区别只在请求体。

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::application::ports::{ExtractError, GenerationError, SynthesisError};

/// Gemini 调用错误
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GeminiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GeminiError::Timeout
        } else if e.is_connect() {
            GeminiError::Network(format!("Cannot connect to Gemini API: {}", e))
        } else if e.is_decode() {
            GeminiError::InvalidResponse(e.to_string())
        } else {
            GeminiError::Network(e.to_string())
        }
    }
}

impl From<GeminiError> for SynthesisError {
    fn from(e: GeminiError) -> Self {
        match e {
            GeminiError::Timeout => SynthesisError::Timeout,
            GeminiError::Network(m) => SynthesisError::NetworkError(m),
            GeminiError::Service(m) => SynthesisError::ServiceError(m),
            GeminiError::InvalidResponse(m) => SynthesisError::InvalidResponse(m),
        }
    }
}

impl From<GeminiError> for GenerationError {
    fn from(e: GeminiError) -> Self {
        match e {
            GeminiError::Timeout => GenerationError::Timeout,
            GeminiError::Network(m) => GenerationError::NetworkError(m),
            GeminiError::Service(m) => GenerationError::ServiceError(m),
            GeminiError::InvalidResponse(m) => GenerationError::MalformedOutput(m),
        }
    }
}

impl From<GeminiError> for ExtractError {
    fn from(e: GeminiError) -> Self {
        match e {
            GeminiError::Timeout => ExtractError::NetworkError("Request timeout".to_string()),
            GeminiError::Network(m) => ExtractError::NetworkError(m),
            other => ExtractError::RecognitionFailed(other.to_string()),
        }
    }
}

/// Gemini 客户端配置
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// 文本生成 / OCR 模型
    pub text_model: String,
    /// 语音合成模型
    pub tts_model: String,
    /// 预置音色
    pub voice: String,
    pub timeout_secs: u64,
}

impl Default for GeminiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            text_model: "gemini-2.5-flash".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Kore".to_string(),
            timeout_secs: 120,
        }
    }
}

impl GeminiClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter())
            .into_iter()
            .flatten()
    }

    /// 第一个候选的全部文本片段
    pub(crate) fn text(&self) -> String {
        self.parts().filter_map(|p| p.text.as_deref()).collect()
    }

    /// 第一个带数据的 inlineData 片段
    pub(crate) fn inline_data(&self) -> Option<&str> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .map(|d| d.data.as_str())
            .find(|d| !d.is_empty())
    }
}

/// Gemini REST 客户端
pub struct GeminiClient {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiClientConfig {
        &self.config
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    pub(crate) async fn generate_content(
        &self,
        model: &str,
        body: &Value,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = self.generate_url(model);
        tracing::debug!(url = %url, model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeminiError::Service(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }

    /// 模型列表接口可达即视为可用
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/v1beta/models", self.config.base_url.trim_end_matches('/'));
        match self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = GeminiClientConfig::default();
        assert_eq!(config.text_model, "gemini-2.5-flash");
        assert_eq!(config.tts_model, "gemini-2.5-flash-preview-tts");
        assert_eq!(config.voice, "Kore");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_generate_url() {
        let client = GeminiClient::new(
            GeminiClientConfig::new("key").with_base_url("http://localhost:9000/"),
        )
        .unwrap();
        assert_eq!(
            client.generate_url("gemini-2.5-flash"),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_response_text_and_inline_data() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"[{\"question\":"},
                {"text":"\"Q\"}]"},
                {"inlineData":{"mimeType":"audio/L16;rate=24000","data":""}},
                {"inlineData":{"mimeType":"audio/L16;rate=24000","data":"AAAA"}}
            ]}}]}"#,
        )
        .unwrap();

        assert_eq!(response.text(), r#"[{"question":"Q"}]"#);
        assert_eq!(response.inline_data(), Some("AAAA"));
    }

    #[test]
    fn test_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), "");
        assert_eq!(response.inline_data(), None);
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            SynthesisError::from(GeminiError::Timeout),
            SynthesisError::Timeout
        ));
        assert!(matches!(
            GenerationError::from(GeminiError::InvalidResponse("x".into())),
            GenerationError::MalformedOutput(_)
        ));
        assert!(matches!(
            ExtractError::from(GeminiError::Service("x".into())),
            ExtractError::RecognitionFailed(_)
        ));
    }
}
