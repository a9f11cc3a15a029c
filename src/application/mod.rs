//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（生成、合成、提取、历史、播放、语音缓存）
//! - audio: 卡片朗读控制器、语音预取、载荷解码
//! - viewer: 当前卡组的浏览状态
//! - export: 纯文本 / PDF 导出
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod audio;
pub mod commands;
pub mod error;
pub mod export;
pub mod ports;
pub mod queries;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use commands::{
    ClearHistory, ExtractText, ExtractTextResponse, GenerateDeck, LoadHistoryItem, StartOver,
    // Handlers
    handlers::{
        ClearHistoryHandler, ExtractTextHandler, GenerateDeckHandler, GenerateDeckResponse,
        LoadHistoryItemHandler, LoadHistoryItemResponse, StartOverHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Generation
    FlashcardGeneratorPort,
    GenerationError,
    // History
    HistoryError,
    HistoryItem,
    HistoryStorePort,
    // Playback
    PlaybackEnginePort,
    PlaybackError,
    SampleBuffer,
    // Speech cache
    generate_cache_key,
    CacheError,
    CacheStats,
    SpeechCachePort,
    // Speech synthesis
    SpeechSynthesizerPort,
    SynthesisError,
    // Source text
    ExtractError,
    SourceFile,
    TextExtractorPort,
};

pub use queries::{
    ExportDeck, ListHistory,
    // Handlers
    handlers::{ExportDeckHandler, ExportDeckResponse, HistorySummary, ListHistoryHandler},
};

pub use viewer::{CardView, CardViewer, ViewerSnapshot};
