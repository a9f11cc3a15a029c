//! Playback Engine Port - 音频输出抽象
//!
//! 引擎持有进程内唯一的输出会话（首次使用时打开，之后复用）。
//! 每个 source 只能播放一次：
//! - `start` 返回的 `PlaybackCompletion` 只在自然播放结束时触发一次
//! - `stop` 立即停止并抑制该 source 的完成通知

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/// 播放错误
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Audio output unavailable: {0}")]
    OutputUnavailable(String),

    #[error("Unknown playback source: {0}")]
    UnknownSource(u64),

    #[error("Playback source already started: {0}")]
    AlreadyStarted(u64),
}

/// 解码后的 PCM 样本缓冲（交错排列的 f32，范围 -1.0..1.0）
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: u16,
    samples: Arc<[f32]>,
}

impl SampleBuffer {
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels,
            samples: samples.into(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// 帧数（每帧包含 channels 个样本）
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.frames() as u64 * 1_000_000_000 / self.sample_rate as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// 一次性播放单元的句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(u64);

impl SourceHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// 完成通知的发送端（由引擎持有）
#[derive(Debug)]
pub struct CompletionNotifier(oneshot::Sender<()>);

impl CompletionNotifier {
    /// 自然播放结束时调用；接收端已丢弃时忽略
    pub fn notify(self) {
        let _ = self.0.send(());
    }
}

/// 完成通知的接收端（由调用方等待）
#[derive(Debug)]
pub struct PlaybackCompletion(oneshot::Receiver<()>);

impl PlaybackCompletion {
    pub fn channel() -> (CompletionNotifier, PlaybackCompletion) {
        let (tx, rx) = oneshot::channel();
        (CompletionNotifier(tx), PlaybackCompletion(rx))
    }

    /// 等待播放结束
    ///
    /// 自然结束返回 true；被 stop（通知端被丢弃）返回 false
    pub async fn ended(self) -> bool {
        self.0.await.is_ok()
    }
}

/// Playback Engine Port
pub trait PlaybackEnginePort: Send + Sync {
    /// 包装样本缓冲为一次性 source（必要时打开输出会话）
    fn create_source(&self, buffer: SampleBuffer) -> Result<SourceHandle, PlaybackError>;

    /// 立即开始播放
    fn start(&self, source: &SourceHandle) -> Result<PlaybackCompletion, PlaybackError>;

    /// 立即停止播放并抑制完成通知；对未知或已结束的 source 无操作
    fn stop(&self, source: &SourceHandle);

    /// 输出会话是否已打开
    fn is_open(&self) -> bool;
}
