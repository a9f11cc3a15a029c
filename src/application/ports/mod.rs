//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod flashcard_generator;
mod history_store;
mod playback_engine;
mod speech_cache;
mod speech_synthesizer;
mod text_extractor;

pub use flashcard_generator::{FlashcardGeneratorPort, GenerationError};
pub use history_store::{HistoryError, HistoryItem, HistoryStorePort, HISTORY_LIMIT};
pub use playback_engine::{
    CompletionNotifier, PlaybackCompletion, PlaybackEnginePort, PlaybackError, SampleBuffer,
    SourceHandle,
};
pub use speech_cache::{generate_cache_key, CacheError, CacheStats, SpeechCachePort};
pub use speech_synthesizer::{is_blank, SpeechSynthesizerPort, SynthesisError};
pub use text_extractor::{ExtractError, SourceFile, TextExtractorPort};
