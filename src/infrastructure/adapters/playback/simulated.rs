//! Simulated Playback Engine - 按缓冲时长计时的播放引擎
//!
//! 不接触音频设备：`start` 启动一个计时任务，时长到达后发出完成通知；
//! `stop` 中止计时任务，通知端随任务一起被丢弃。

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

use crate::application::ports::{
    PlaybackCompletion, PlaybackEnginePort, PlaybackError, SampleBuffer, SourceHandle,
};

struct SimulatedSource {
    duration: Duration,
    timer: Option<AbortHandle>,
}

/// Simulated Playback Engine
#[derive(Default)]
pub struct SimulatedPlaybackEngine {
    next_id: AtomicU64,
    open: AtomicBool,
    sources: Arc<DashMap<u64, SimulatedSource>>,
}

impl SimulatedPlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尚未结束的 source 数量
    pub fn active_count(&self) -> usize {
        self.sources.len()
    }
}

impl PlaybackEnginePort for SimulatedPlaybackEngine {
    fn create_source(&self, buffer: SampleBuffer) -> Result<SourceHandle, PlaybackError> {
        if !self.open.swap(true, Ordering::SeqCst) {
            tracing::info!("Simulated audio output opened");
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.sources.insert(
            id,
            SimulatedSource {
                duration: buffer.duration(),
                timer: None,
            },
        );
        Ok(SourceHandle::new(id))
    }

    fn start(&self, source: &SourceHandle) -> Result<PlaybackCompletion, PlaybackError> {
        let id = source.id();
        let mut entry = self
            .sources
            .get_mut(&id)
            .ok_or(PlaybackError::UnknownSource(id))?;
        if entry.timer.is_some() {
            return Err(PlaybackError::AlreadyStarted(id));
        }

        let (notifier, completion) = PlaybackCompletion::channel();
        let duration = entry.duration;
        let sources = self.sources.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            sources.remove(&id);
            notifier.notify();
        });
        entry.timer = Some(task.abort_handle());

        tracing::debug!(source = id, duration_ms = duration.as_millis() as u64, "Simulated playback started");
        Ok(completion)
    }

    fn stop(&self, source: &SourceHandle) {
        if let Some((id, entry)) = self.sources.remove(&source.id()) {
            if let Some(timer) = entry.timer {
                timer.abort();
            }
            tracing::debug!(source = id, "Simulated playback stopped");
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(millis: usize) -> SampleBuffer {
        SampleBuffer::new(1000, 1, vec![0.0; millis])
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_after_duration() {
        let engine = SimulatedPlaybackEngine::new();
        assert!(!engine.is_open());

        let source = engine.create_source(buffer(100)).unwrap();
        assert!(engine.is_open());
        let completion = engine.start(&source).unwrap();

        assert!(completion.ended().await);
        assert_eq!(engine.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_suppresses_completion() {
        let engine = SimulatedPlaybackEngine::new();
        let source = engine.create_source(buffer(100)).unwrap();
        let completion = engine.start(&source).unwrap();

        engine.stop(&source);
        assert!(!completion.ended().await);
        engine.stop(&source);
    }

    #[tokio::test]
    async fn test_source_plays_once() {
        let engine = SimulatedPlaybackEngine::new();
        let source = engine.create_source(buffer(10)).unwrap();
        engine.start(&source).unwrap();

        assert!(matches!(
            engine.start(&source),
            Err(PlaybackError::AlreadyStarted(_))
        ));
        assert!(matches!(
            engine.start(&SourceHandle::new(99)),
            Err(PlaybackError::UnknownSource(99))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_buffer_completes_immediately() {
        let engine = SimulatedPlaybackEngine::new();
        let source = engine
            .create_source(SampleBuffer::new(24000, 1, Vec::new()))
            .unwrap();
        assert!(engine.start(&source).unwrap().ended().await);
    }
}
