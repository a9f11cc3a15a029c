//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::info;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5070,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 构建 Router
    fn build_router(&self) -> Router {
        // CORS 配置 - 允许所有来源的跨域请求
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .expose_headers(Any)
            .max_age(std::time::Duration::from_secs(3600));

        // 构建路由，请求体上限 20MB（图片上传）
        create_routes()
            .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use http::{Request, StatusCode};
    use serde_json::Value;
    use std::time::Duration;
    use tower::util::ServiceExt;

    use crate::application::audio::ControllerConfig;
    use crate::application::testing::MemoryHistory;
    use crate::infrastructure::adapters::{
        FakeFlashcardGenerator, FakeSpeechSynthesizer, FakeSynthesizerConfig, PlainTextExtractor,
        SimulatedPlaybackEngine,
    };
    use crate::infrastructure::events::EventPublisher;

    fn router() -> Router {
        let synthesizer = FakeSpeechSynthesizer::new(FakeSynthesizerConfig {
            latency: Duration::ZERO,
            ..Default::default()
        });
        let state = AppState::new(
            Arc::new(FakeFlashcardGenerator::new()),
            Arc::new(synthesizer),
            vec![Arc::new(PlainTextExtractor::new())],
            Arc::new(MemoryHistory::new()),
            Arc::new(SimulatedPlaybackEngine::new()),
            Arc::new(EventPublisher::new()),
            ControllerConfig::default(),
        );
        HttpServer::new(ServerConfig::default(), state).build_router()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json(app: &Router, request: Request<Body>) -> Value {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const SOURCE: &str = "The mitochondria produces energy for the cell. \
                          Ribosomes assemble proteins from amino acids.";

    #[tokio::test]
    async fn test_ping() {
        let app = router();
        let body = json(&app, get("/api/ping")).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_viewer_without_deck_reports_errno() {
        let app = router();
        let body = json(&app, post_json("/api/viewer/next", Value::Null)).await;
        assert_eq!(body["errno"], 409);
        assert_eq!(body["error"], "No flashcards loaded");
    }

    #[tokio::test]
    async fn test_generate_navigate_and_export() {
        let app = router();

        let body = json(
            &app,
            post_json("/api/deck/generate", serde_json::json!({ "text": SOURCE, "style": "qa" })),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["viewer"]["total_cards"], 2);
        assert_eq!(body["data"]["viewer"]["index"], 0);
        assert_eq!(body["data"]["history_saved"], true);

        let body = json(&app, post_json("/api/viewer/next", Value::Null)).await;
        assert_eq!(body["data"]["index"], 1);

        let body = json(&app, post_json("/api/viewer/flip", Value::Null)).await;
        assert_eq!(body["data"]["flipped"], true);

        let response = app.clone().oneshot(get("/api/deck/export/text")).await.unwrap();
        assert_eq!(
            response.headers()[http::header::CONTENT_DISPOSITION],
            "attachment; filename=\"flashcards.txt\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("Ribosomes assemble proteins from amino acids."));

        let body = json(&app, get("/api/history/list")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_text_and_unknown_style() {
        let app = router();

        let body = json(
            &app,
            post_json("/api/deck/generate", serde_json::json!({ "text": "   " })),
        )
        .await;
        assert_eq!(body["errno"], 400);

        let body = json(
            &app,
            post_json("/api/deck/generate", serde_json::json!({ "text": SOURCE, "style": "poem" })),
        )
        .await;
        assert_eq!(body["errno"], 400);
    }

    #[tokio::test]
    async fn test_extract_text_from_upload() {
        let app = router();
        let boundary = "quickflash-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n  Photosynthesis converts light.  \r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/source/extract")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();

        let body = json(&app, request).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["text"], "Photosynthesis converts light.");
    }

    #[tokio::test]
    async fn test_load_unknown_history_item() {
        let app = router();
        let body = json(
            &app,
            post_json("/api/history/load", serde_json::json!({ "id": "hist-0" })),
        )
        .await;
        assert_eq!(body["errno"], 404);
    }
}
