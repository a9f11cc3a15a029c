//! Fake Adapters - 离线模式（未配置 API key 时使用）

mod fake_generator;
mod fake_synthesizer;

pub use fake_generator::FakeFlashcardGenerator;
pub use fake_synthesizer::{FakeSpeechSynthesizer, FakeSynthesizerConfig};
