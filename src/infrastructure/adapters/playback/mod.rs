//! Playback Adapters - 播放引擎实现

#[cfg(feature = "audio-output")]
mod device;
mod simulated;

#[cfg(feature = "audio-output")]
pub use device::DevicePlaybackEngine;
pub use simulated::SimulatedPlaybackEngine;
