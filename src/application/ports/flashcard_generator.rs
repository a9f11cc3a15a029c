//! Flashcard Generator Port - 闪卡生成抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CardContent, StyleKind};

/// 生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    /// 模型输出无法解析为卡片列表
    #[error("Failed to generate flashcards. The AI model might have returned an invalid format: {0}")]
    MalformedOutput(String),

    #[error("The model didn't generate any flashcards")]
    Empty,
}

/// Flashcard Generator Port
#[async_trait]
pub trait FlashcardGeneratorPort: Send + Sync {
    /// 从原文生成闪卡
    ///
    /// 输出为空时返回 `GenerationError::Empty`
    async fn generate(
        &self,
        source_text: &str,
        style: StyleKind,
    ) -> Result<Vec<CardContent>, GenerationError>;
}
