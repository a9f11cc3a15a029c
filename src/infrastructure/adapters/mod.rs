//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod fake;
pub mod gemini;
pub mod playback;
pub mod text;

mod cached_synthesizer;

pub use cached_synthesizer::CachedSpeechSynthesizer;
pub use fake::{FakeFlashcardGenerator, FakeSpeechSynthesizer, FakeSynthesizerConfig};
pub use gemini::*;
#[cfg(feature = "audio-output")]
pub use playback::DevicePlaybackEngine;
pub use playback::SimulatedPlaybackEngine;
pub use text::PlainTextExtractor;
