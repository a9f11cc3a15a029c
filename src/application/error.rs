//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{ExtractError, GenerationError, HistoryError};
use crate::domain::DeckError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// 当前没有卡组
    pub fn no_deck() -> Self {
        Self::InvalidState("No flashcards loaded".to_string())
    }
}

impl From<DeckError> for ApplicationError {
    fn from(err: DeckError) -> Self {
        match err {
            DeckError::Empty => Self::ExternalServiceError(err.to_string()),
            DeckError::IndexOutOfRange { .. } => Self::ValidationError(err.to_string()),
        }
    }
}

impl From<HistoryError> for ApplicationError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::NotFound(id) => Self::not_found("History item", id),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<GenerationError> for ApplicationError {
    fn from(err: GenerationError) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}

impl From<ExtractError> for ApplicationError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedType(_) | ExtractError::InvalidEncoding(_) => {
                Self::ValidationError(err.to_string())
            }
            other => Self::ExternalServiceError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_not_found_maps_to_not_found() {
        let err: ApplicationError = HistoryError::NotFound("hist-1".to_string()).into();
        assert!(matches!(
            err,
            ApplicationError::NotFound {
                resource_type: "History item",
                ..
            }
        ));
        assert_eq!(err.to_string(), "History item not found: hist-1");
    }

    #[test]
    fn test_unsupported_file_is_validation_error() {
        let err: ApplicationError =
            ExtractError::UnsupportedType("application/pdf".to_string()).into();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
