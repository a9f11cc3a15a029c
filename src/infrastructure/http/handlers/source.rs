//! Source Handlers - 上传文件提取文本

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::ports::SourceFile;
use crate::application::ExtractText;
use crate::infrastructure::http::dto::{ApiResponse, ExtractTextResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 上传图片或 .txt 文件，返回提取的文本
pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ExtractTextResponse>>, ApiError> {
    let mut file: Option<SourceFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let mime_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
            .to_vec();

        file = Some(SourceFile {
            file_name,
            mime_type,
            data,
        });
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;
    tracing::info!(
        file_name = ?file.file_name,
        mime_type = %file.mime_type,
        size = file.data.len(),
        "Extracting text from upload"
    );

    let result = state.extract_text_handler.handle(ExtractText { file }).await?;

    Ok(Json(ApiResponse::success(ExtractTextResponse {
        text: result.text,
    })))
}
