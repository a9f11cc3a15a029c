//! Gemini Speech Synthesizer
//!
//! 返回 inlineData 中的 base64 载荷（24kHz 单声道 16-bit PCM，无文件头）

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::client::GeminiClient;
use crate::application::ports::{is_blank, SpeechSynthesizerPort, SynthesisError};
use crate::domain::{to_speech_text, AudioPayload};

pub(crate) fn request_body(text: &str, voice: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": to_speech_text(text) }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        }
    })
}

/// Gemini 语音合成
pub struct GeminiSpeechSynthesizer {
    client: Arc<GeminiClient>,
    voice: String,
}

impl GeminiSpeechSynthesizer {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        let voice = client.config().voice.clone();
        Self { client, voice }
    }
}

#[async_trait]
impl SpeechSynthesizerPort for GeminiSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError> {
        if is_blank(text) {
            return Ok(AudioPayload::empty());
        }

        let model = self.client.config().tts_model.clone();
        let response = self
            .client
            .generate_content(&model, &request_body(text, &self.voice))
            .await?;

        let data = response.inline_data().ok_or(SynthesisError::EmptyAudio)?;
        tracing::debug!(
            model = %model,
            text_len = text.len(),
            payload_len = data.len(),
            "Speech synthesized"
        );
        Ok(AudioPayload::from(data))
    }

    fn voice(&self) -> &str {
        &self.voice
    }

    async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::gemini::GeminiClientConfig;
    use axum::{routing::post, Json, Router};

    async fn serve(response: Value) -> String {
        let app = Router::new().route(
            "/v1beta/models/*model",
            post(move || {
                let response = response.clone();
                async move { Json(response) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn synthesizer(base_url: &str) -> GeminiSpeechSynthesizer {
        let client =
            GeminiClient::new(GeminiClientConfig::new("test-key").with_base_url(base_url)).unwrap();
        GeminiSpeechSynthesizer::new(Arc::new(client))
    }

    #[test]
    fn test_request_body_replaces_delimiter() {
        let body = request_body("TOPIC||summary", "Kore");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "TOPIC\nsummary");
        assert_eq!(
            body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Kore"
        );
    }

    #[tokio::test]
    async fn test_blank_text_skips_remote_call() {
        // 端口 9 无服务监听，发起请求必然失败
        let synth = synthesizer("http://127.0.0.1:9");
        let payload = synth.synthesize("  \n ").await.unwrap();
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn test_returns_inline_audio() {
        let base_url = serve(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAAA" } }
            ]}}]
        }))
        .await;

        let payload = synthesizer(&base_url).synthesize("Hello").await.unwrap();
        assert_eq!(payload.as_str(), "AAAA");
    }

    #[tokio::test]
    async fn test_missing_audio_is_error() {
        let base_url = serve(json!({ "candidates": [] })).await;
        assert!(matches!(
            synthesizer(&base_url).synthesize("Hello").await,
            Err(SynthesisError::EmptyAudio)
        ));
    }
}
