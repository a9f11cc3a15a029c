//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                  GET   健康检查
//! - /api/source/extract        POST  上传图片或 .txt，提取文本
//! - /api/deck/generate         POST  生成卡组并载入
//! - /api/deck/start_over       POST  清空当前卡组
//! - /api/deck/export/text      GET   导出纯文本
//! - /api/deck/export/pdf       GET   导出 PDF
//! - /api/viewer/state          GET   当前浏览状态
//! - /api/viewer/goto           POST  跳到指定卡片
//! - /api/viewer/next           POST  下一张
//! - /api/viewer/prev           POST  上一张
//! - /api/viewer/flip           POST  翻面
//! - /api/viewer/read           POST  朗读一面（正在朗读时停止）
//! - /api/viewer/stop           POST  停止朗读
//! - /api/viewer/auto_read      POST  自动朗读开关
//! - /api/history/list          GET   历史列表
//! - /api/history/load          POST  载入历史卡组
//! - /api/history/clear         POST  清空历史
//! - /ws/events                 WS    卡组事件（预取进度、播放状态）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::events_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/source/extract", post(handlers::extract_text))
        .nest("/deck", deck_routes())
        .nest("/viewer", viewer_routes())
        .nest("/history", history_routes())
}

/// Deck 路由
fn deck_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_deck))
        .route("/start_over", post(handlers::start_over))
        .route("/export/text", get(handlers::export_text))
        .route("/export/pdf", get(handlers::export_pdf))
}

/// Viewer 路由
fn viewer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/state", get(handlers::viewer_state))
        .route("/goto", post(handlers::go_to))
        .route("/next", post(handlers::next_card))
        .route("/prev", post(handlers::prev_card))
        .route("/flip", post(handlers::flip))
        .route("/read", post(handlers::read))
        .route("/stop", post(handlers::stop))
        .route("/auto_read", post(handlers::set_auto_read))
}

/// History 路由
fn history_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", get(handlers::list_history))
        .route("/load", post(handlers::load_history))
        .route("/clear", post(handlers::clear_history))
}
