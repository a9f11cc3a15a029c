//! Audio Decoder - 语音载荷解码
//!
//! 两步：
//! 1. `decode`: base64 传输解码 → 原始字节
//! 2. `decode_audio_data`: 无文件头 16-bit LE PCM → `SampleBuffer`
//!
//! TTS 服务返回的 PCM 不带格式信息，采样率和声道数必须显式给出。

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::application::ports::SampleBuffer;
use crate::domain::AudioPayload;

/// 每个样本的字节数（16-bit PCM）
const BYTES_PER_SAMPLE: usize = 2;

/// 传输解码错误
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid audio payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

/// 音频格式错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioFormatError {
    #[error("Audio data length {len} is not a multiple of the {frame_size}-byte frame size")]
    PartialFrame { len: usize, frame_size: usize },

    #[error("Invalid audio layout: {sample_rate} Hz, {channels} channels")]
    InvalidLayout { sample_rate: u32, channels: u16 },
}

/// base64 传输解码
pub fn decode(payload: &AudioPayload) -> Result<Vec<u8>, DecodeError> {
    Ok(STANDARD.decode(payload.as_str().trim())?)
}

/// 解析 16-bit LE PCM 为交错 f32 样本
pub fn decode_audio_data(
    raw: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<SampleBuffer, AudioFormatError> {
    if sample_rate == 0 || channels == 0 {
        return Err(AudioFormatError::InvalidLayout {
            sample_rate,
            channels,
        });
    }

    let frame_size = BYTES_PER_SAMPLE * channels as usize;
    if raw.len() % frame_size != 0 {
        return Err(AudioFormatError::PartialFrame {
            len: raw.len(),
            frame_size,
        });
    }

    let samples = raw
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
        .collect();

    Ok(SampleBuffer::new(sample_rate, channels, samples))
}

/// 固定格式的解码器
#[derive(Debug, Clone, Copy)]
pub struct AudioDecoder {
    sample_rate: u32,
    channels: u16,
}

impl AudioDecoder {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// 载荷 → 样本缓冲
    pub fn decode_payload(&self, payload: &AudioPayload) -> Result<SampleBuffer, AudioError> {
        let raw = decode(payload)?;
        Ok(decode_audio_data(&raw, self.sample_rate, self.channels)?)
    }
}

impl Default for AudioDecoder {
    fn default() -> Self {
        Self::new(24000, 1)
    }
}

/// 播放链路上的错误汇总
#[derive(Debug, Error)]
pub enum AudioError {
    #[error(transparent)]
    Synthesis(#[from] crate::application::ports::SynthesisError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Format(#[from] AudioFormatError),

    #[error(transparent)]
    Playback(#[from] crate::application::ports::PlaybackError),
}

/// 编码 PCM 样本为 base64 载荷（测试和假合成器使用）
pub fn encode_pcm(samples: &[i16]) -> AudioPayload {
    let raw: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    AudioPayload::from(STANDARD.encode(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let payload = AudioPayload::from("not base64!!");
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_decode_audio_data_scales_samples() {
        let raw: Vec<u8> = [0i16, 16384, -32768]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let buffer = decode_audio_data(&raw, 24000, 1).unwrap();
        assert_eq!(buffer.samples(), &[0.0, 0.5, -1.0]);
        assert_eq!(buffer.frames(), 3);
    }

    #[test]
    fn test_partial_frame_is_format_error() {
        // 3 字节不是 2 字节帧的整数倍
        assert_eq!(
            decode_audio_data(&[0, 1, 2], 24000, 1).unwrap_err(),
            AudioFormatError::PartialFrame {
                len: 3,
                frame_size: 2
            }
        );
        // 立体声帧为 4 字节
        assert_eq!(
            decode_audio_data(&[0, 0, 0, 0, 0, 0], 24000, 2).unwrap_err(),
            AudioFormatError::PartialFrame {
                len: 6,
                frame_size: 4
            }
        );
    }

    #[test]
    fn test_zero_channels_rejected() {
        assert!(matches!(
            decode_audio_data(&[], 24000, 0),
            Err(AudioFormatError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn test_decoder_round_trip_through_payload() {
        let decoder = AudioDecoder::default();
        let buffer = decoder.decode_payload(&encode_pcm(&[0; 2400])).unwrap();
        assert_eq!(buffer.sample_rate(), 24000);
        assert_eq!(buffer.duration(), std::time::Duration::from_millis(100));
    }

    #[test]
    fn test_empty_payload_decodes_to_empty_buffer() {
        let buffer = AudioDecoder::default()
            .decode_payload(&AudioPayload::empty())
            .unwrap();
        assert!(buffer.is_empty());
    }
}
