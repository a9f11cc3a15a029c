//! Gemini Adapter - 卡片生成、语音合成、图片识别

mod client;
mod generator;
mod ocr;
mod synthesizer;

pub use client::{GeminiClient, GeminiClientConfig, GeminiError};
pub use generator::GeminiFlashcardGenerator;
pub use ocr::GeminiImageExtractor;
pub use synthesizer::GeminiSpeechSynthesizer;
