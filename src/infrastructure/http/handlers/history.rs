//! History Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{ClearHistory, ListHistory, LoadHistoryItem};
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, HistorySummaryResponse, LoadHistoryRequest, LoadHistoryResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 列出历史记录（最新在前）
pub async fn list_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<HistorySummaryResponse>>>, ApiError> {
    let items = state.list_history_handler.handle(ListHistory).await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(HistorySummaryResponse::from).collect(),
    )))
}

/// 载入历史卡组
pub async fn load_history(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoadHistoryRequest>,
) -> Result<Json<ApiResponse<LoadHistoryResponse>>, ApiError> {
    let result = state
        .load_history_item_handler
        .handle(LoadHistoryItem { id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(LoadHistoryResponse {
        item: result.item.into(),
        viewer: result.snapshot,
    })))
}

pub async fn clear_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.clear_history_handler.handle(ClearHistory).await?;
    Ok(Json(ApiResponse::ok()))
}
