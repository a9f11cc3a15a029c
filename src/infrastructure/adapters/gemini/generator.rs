//! Gemini Flashcard Generator
//!
//! 使用 JSON schema 约束模型输出：
//! - 问答卡: `[{question, answer}]`
//! - 概念卡: `[{topic, summary, details[]}]`，映射为正面 `TOPIC||summary`、反面 `• d1\n• d2`

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::client::GeminiClient;
use crate::application::ports::{FlashcardGeneratorPort, GenerationError};
use crate::domain::{CardContent, StyleKind, CONCEPT_DELIMITER};

#[derive(Debug, Deserialize)]
struct RawQaCard {
    question: String,
    answer: String,
}

#[derive(Debug, Deserialize)]
struct RawConceptCard {
    topic: String,
    summary: String,
    #[serde(default)]
    details: Vec<String>,
}

fn prompt(source_text: &str, style: StyleKind) -> String {
    match style {
        StyleKind::Qa => format!(
            "You are an expert at creating study materials. Analyze the following text and \
             generate a set of flashcards. Each flashcard should have a clear question and a \
             concise answer. Focus on the most important concepts, definitions, and key facts. \
             Here is the text: \n\n\"{source_text}\""
        ),
        StyleKind::Concept => format!(
            "You are an expert at creating study materials. Analyze the following text and \
             generate a set of flashcards. For each card, identify a main topic, provide a \
             concise summary (maximum 12 words), and list the key details as bullet points. \
             Here is the text: \n\n\"{source_text}\""
        ),
    }
}

fn response_schema(style: StyleKind) -> Value {
    match style {
        StyleKind::Qa => json!({
            "type": "ARRAY",
            "description": "A list of flashcards generated from the text.",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "question": {
                        "type": "STRING",
                        "description": "The question, term, or concept for the front of the flashcard."
                    },
                    "answer": {
                        "type": "STRING",
                        "description": "The answer, definition, or explanation for the back of the flashcard."
                    }
                },
                "required": ["question", "answer"]
            }
        }),
        StyleKind::Concept => json!({
            "type": "ARRAY",
            "description": "A list of concept-based flashcards generated from the text.",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "topic": {
                        "type": "STRING",
                        "description": "The main topic or concept, in ALL CAPS."
                    },
                    "summary": {
                        "type": "STRING",
                        "description": "A concise summary of the topic, maximum 12 words."
                    },
                    "details": {
                        "type": "ARRAY",
                        "description": "Key details about the topic as an array of bullet points.",
                        "items": { "type": "STRING" }
                    }
                },
                "required": ["topic", "summary", "details"]
            }
        }),
    }
}

pub(crate) fn request_body(source_text: &str, style: StyleKind) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt(source_text, style) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(style)
        }
    })
}

/// 去掉模型偶尔附带的 ``` 代码块标记
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// 解析模型输出为卡片内容
pub(crate) fn parse_cards(text: &str, style: StyleKind) -> Result<Vec<CardContent>, GenerationError> {
    let json = strip_fences(text);
    let malformed = |e: serde_json::Error| GenerationError::MalformedOutput(e.to_string());

    let cards: Vec<CardContent> = match style {
        StyleKind::Qa => serde_json::from_str::<Vec<RawQaCard>>(json)
            .map_err(malformed)?
            .into_iter()
            .map(|c| CardContent::new(c.question, c.answer, StyleKind::Qa))
            .collect(),
        StyleKind::Concept => serde_json::from_str::<Vec<RawConceptCard>>(json)
            .map_err(malformed)?
            .into_iter()
            .map(|c| {
                CardContent::new(
                    format!("{}{}{}", c.topic, CONCEPT_DELIMITER, c.summary),
                    format!("• {}", c.details.join("\n• ")),
                    StyleKind::Concept,
                )
            })
            .collect(),
    };

    if cards.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(cards)
}

/// Gemini 卡片生成器
pub struct GeminiFlashcardGenerator {
    client: Arc<GeminiClient>,
}

impl GeminiFlashcardGenerator {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FlashcardGeneratorPort for GeminiFlashcardGenerator {
    async fn generate(
        &self,
        source_text: &str,
        style: StyleKind,
    ) -> Result<Vec<CardContent>, GenerationError> {
        let model = self.client.config().text_model.clone();
        let response = self
            .client
            .generate_content(&model, &request_body(source_text, style))
            .await?;

        let cards = parse_cards(&response.text(), style)?;
        tracing::info!(model = %model, style = %style, cards = cards.len(), "Gemini generation completed");
        Ok(cards)
    }
}
