//! Audio - 卡片朗读与语音预取

mod controller;
mod decoder;
mod fence;
mod prefetch;

pub use controller::{
    CardAudioController, Continuation, ControllerConfig, PlaybackState, AUDIO_ERROR_MESSAGE,
};
pub use decoder::{
    decode, decode_audio_data, encode_pcm, AudioDecoder, AudioError, AudioFormatError,
    DecodeError,
};
pub use fence::{FenceToken, OperationFence};
pub use prefetch::{DeckPrefetchScheduler, PrefetchHandle, PrefetchReport};
