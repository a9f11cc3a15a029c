//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    audio::ControllerConfig,
    // Command handlers
    ClearHistoryHandler, ExtractTextHandler, GenerateDeckHandler, LoadHistoryItemHandler,
    StartOverHandler,
    // Query handlers
    ExportDeckHandler, ListHistoryHandler,
    // Ports
    FlashcardGeneratorPort, HistoryStorePort, PlaybackEnginePort, SpeechSynthesizerPort,
    TextExtractorPort,
    CardViewer,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
///
/// 进程内只有一个卡片浏览器，所有请求共享
pub struct AppState {
    // ========== Ports ==========
    pub event_publisher: Arc<EventPublisher>,
    pub viewer: Arc<CardViewer>,

    // ========== Command Handlers ==========
    pub generate_deck_handler: GenerateDeckHandler,
    pub start_over_handler: StartOverHandler,
    pub extract_text_handler: ExtractTextHandler,
    pub load_history_item_handler: LoadHistoryItemHandler,
    pub clear_history_handler: ClearHistoryHandler,

    // ========== Query Handlers ==========
    pub list_history_handler: ListHistoryHandler,
    pub export_deck_handler: ExportDeckHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        generator: Arc<dyn FlashcardGeneratorPort>,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        extractors: Vec<Arc<dyn TextExtractorPort>>,
        history: Arc<dyn HistoryStorePort>,
        engine: Arc<dyn PlaybackEnginePort>,
        event_publisher: Arc<EventPublisher>,
        controller_config: ControllerConfig,
    ) -> Self {
        let viewer = Arc::new(CardViewer::new(
            synthesizer,
            engine,
            event_publisher.clone(),
            controller_config,
        ));

        Self {
            // Ports
            event_publisher,
            viewer: viewer.clone(),

            // Command handlers
            generate_deck_handler: GenerateDeckHandler::new(
                generator,
                history.clone(),
                viewer.clone(),
            ),
            start_over_handler: StartOverHandler::new(viewer.clone()),
            extract_text_handler: ExtractTextHandler::new(extractors),
            load_history_item_handler: LoadHistoryItemHandler::new(history.clone(), viewer.clone()),
            clear_history_handler: ClearHistoryHandler::new(history.clone()),

            // Query handlers
            list_history_handler: ListHistoryHandler::new(history),
            export_deck_handler: ExportDeckHandler::new(viewer),
        }
    }
}
