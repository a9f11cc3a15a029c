//! Deck Handlers - 生成、重置、导出

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::export::ExportFormat;
use crate::application::{ExportDeck, GenerateDeck, StartOver};
use crate::infrastructure::http::dto::{
    ApiResponse, GenerateDeckRequest, GenerateDeckResponse, StartOverResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 生成卡组并载入浏览器
pub async fn generate_deck(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateDeckRequest>,
) -> Result<Json<ApiResponse<GenerateDeckResponse>>, ApiError> {
    let style = req.style().ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Unknown style: {}",
            req.style.as_deref().unwrap_or_default()
        ))
    })?;

    let result = state
        .generate_deck_handler
        .handle(GenerateDeck {
            source_text: req.text,
            style,
        })
        .await?;

    Ok(Json(ApiResponse::success(GenerateDeckResponse {
        viewer: result.snapshot,
        history_saved: result.history.is_some(),
    })))
}

/// 清空当前卡组
pub async fn start_over(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StartOverResponse>>, ApiError> {
    let cleared = state.start_over_handler.handle(StartOver).await?;
    Ok(Json(ApiResponse::success(StartOverResponse {
        cleared: cleared.is_some(),
    })))
}

/// 导出为纯文本
pub async fn export_text(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    export(&state, ExportFormat::Text).await
}

/// 导出为 PDF
pub async fn export_pdf(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    export(&state, ExportFormat::Pdf).await
}

async fn export(state: &AppState, format: ExportFormat) -> Result<Response, ApiError> {
    let result = state.export_deck_handler.handle(ExportDeck { format }).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", result.file_name),
        )
        .header(header::CONTENT_LENGTH, result.bytes.len())
        .body(Body::from(result.bytes))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
