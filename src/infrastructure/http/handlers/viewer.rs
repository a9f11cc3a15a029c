//! Viewer Handlers - 翻页、翻面、朗读

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::ViewerSnapshot;
use crate::infrastructure::http::dto::{ApiResponse, AutoReadRequest, GoToRequest, ReadRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

type SnapshotResult = Result<Json<ApiResponse<ViewerSnapshot>>, ApiError>;

/// 当前浏览状态
pub async fn viewer_state(State(state): State<Arc<AppState>>) -> SnapshotResult {
    Ok(Json(ApiResponse::success(state.viewer.snapshot())))
}

pub async fn go_to(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoToRequest>,
) -> SnapshotResult {
    Ok(Json(ApiResponse::success(state.viewer.go_to(req.index)?)))
}

pub async fn next_card(State(state): State<Arc<AppState>>) -> SnapshotResult {
    Ok(Json(ApiResponse::success(state.viewer.next()?)))
}

pub async fn prev_card(State(state): State<Arc<AppState>>) -> SnapshotResult {
    Ok(Json(ApiResponse::success(state.viewer.prev()?)))
}

pub async fn flip(State(state): State<Arc<AppState>>) -> SnapshotResult {
    Ok(Json(ApiResponse::success(state.viewer.flip()?)))
}

/// 朗读一面；该面正在朗读时为停止
pub async fn read(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReadRequest>,
) -> SnapshotResult {
    Ok(Json(ApiResponse::success(state.viewer.read(req.side).await?)))
}

pub async fn stop(State(state): State<Arc<AppState>>) -> SnapshotResult {
    Ok(Json(ApiResponse::success(state.viewer.stop())))
}

pub async fn set_auto_read(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AutoReadRequest>,
) -> SnapshotResult {
    Ok(Json(ApiResponse::success(
        state.viewer.set_auto_read(req.enabled),
    )))
}
