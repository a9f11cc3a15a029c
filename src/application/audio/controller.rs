//! Card Audio Controller - 当前卡片的朗读控制
//!
//! 状态机: `Idle → Synthesizing → Decoding → Playing → Idle`，`stop()` 可从任意状态回到 `Idle`。
//!
//! 每次朗读在入口处捕获栅栏令牌，之后每个状态边界（以及开始播放前）都重新检查；
//! 令牌失效说明用户已停止、切换卡片或发起了新的朗读，此时静默放弃，不改状态也不报错。
//! 同一时刻最多只有一个活动 source，新 source 只在旧 source 同步停止之后创建。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::decoder::{AudioDecoder, AudioError};
use super::fence::{FenceToken, OperationFence};
use crate::application::ports::{
    PlaybackCompletion, PlaybackEnginePort, SourceHandle, SpeechSynthesizerPort,
};
use crate::domain::{AudioPayload, Card, Side};
use crate::infrastructure::events::EventPublisher;

/// 用户可见的播放失败提示
pub const AUDIO_ERROR_MESSAGE: &str = "Could not play audio";

/// 朗读自然结束后执行的回调
pub type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Synthesizing(Side),
    Decoding(Side),
    Playing(Side),
}

impl PlaybackState {
    /// 正在朗读（含合成、解码阶段）的一面
    pub fn side(&self) -> Option<Side> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Synthesizing(side)
            | PlaybackState::Decoding(side)
            | PlaybackState::Playing(side) => Some(*side),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Synthesizing(_) => "synthesizing",
            PlaybackState::Decoding(_) => "decoding",
            PlaybackState::Playing(_) => "playing",
        }
    }
}

/// 控制器配置
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    pub decoder: AudioDecoder,
    /// 自动朗读：正面读完、翻面后到开始读反面的间隔
    pub auto_read_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            decoder: AudioDecoder::default(),
            auto_read_delay: Duration::from_millis(200),
        }
    }
}

struct ControllerInner {
    fence: OperationFence,
    state: PlaybackState,
    active: Option<SourceHandle>,
    error: Option<String>,
    detached: bool,
}

/// 卡片朗读控制器
///
/// 绑定一张正在展示的卡片。切换卡片时先 `detach()`，再为新卡片创建新的控制器。
/// 克隆共享同一份内部状态。
#[derive(Clone)]
pub struct CardAudioController {
    card: Arc<Card>,
    inner: Arc<Mutex<ControllerInner>>,
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    engine: Arc<dyn PlaybackEnginePort>,
    events: Arc<EventPublisher>,
    config: ControllerConfig,
}

impl CardAudioController {
    pub fn new(
        card: Arc<Card>,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        engine: Arc<dyn PlaybackEnginePort>,
        events: Arc<EventPublisher>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            card,
            inner: Arc::new(Mutex::new(ControllerInner {
                fence: OperationFence::new(),
                state: PlaybackState::Idle,
                active: None,
                error: None,
                detached: false,
            })),
            synthesizer,
            engine,
            events,
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn card(&self) -> &Arc<Card> {
        &self.card
    }

    pub fn state(&self) -> PlaybackState {
        self.lock().state
    }

    pub fn speaking_side(&self) -> Option<Side> {
        self.lock().state.side()
    }

    /// 最近一次用户可见的错误（新的朗读开始时清除）
    pub fn last_error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn fence_token(&self) -> FenceToken {
        self.lock().fence.current()
    }

    pub fn is_detached(&self) -> bool {
        self.lock().detached
    }

    /// 朗读卡片的一面
    ///
    /// 该面正在朗读时等同于 `stop()`。否则先停止当前播放，再依次合成（优先使用已预取的载荷）、
    /// 解码、开始播放。方法在播放开始（或流程被放弃）后返回，自然播放结束后执行 `then`。
    ///
    /// 令牌捕获之后的流程在控制器自己的任务中执行，调用方的 future 被丢弃时流程照常
    /// 走到播放或失败，不会停留在中间状态。
    pub async fn read_aloud(&self, side: Side, then: Option<Continuation>) {
        let token = {
            let mut inner = self.lock();
            if inner.detached {
                tracing::debug!(side = %side, "Controller detached, ignoring read request");
                return;
            }
            if inner.state.side() == Some(side) {
                self.stop_locked(&mut inner);
                return;
            }
            self.stop_locked(&mut inner);
            inner.error = None;
            self.transition(&mut inner, PlaybackState::Synthesizing(side));
            inner.fence.current()
        };

        let controller = self.clone();
        let flow = tokio::spawn(async move {
            if let Err(e) = controller.run(side, token, then).await {
                controller.fail(side, token, e);
            }
        });
        if let Err(e) = flow.await {
            tracing::warn!(side = %side, error = %e, "Read task aborted");
        }
    }

    /// 自动朗读：读正面，读完后翻面，延迟后读反面
    pub async fn read_through(&self, on_flip: Continuation) {
        let controller = self.clone();
        let then: Continuation = Box::new(move || {
            on_flip();
            let token = controller.fence_token();
            tokio::spawn(async move {
                tokio::time::sleep(controller.config.auto_read_delay).await;
                if controller.fence_token() != token {
                    tracing::debug!(token = %token, "Auto read superseded, skipping back side");
                    return;
                }
                controller.read_aloud(Side::Back, None).await;
            });
        });

        self.read_aloud(Side::Front, Some(then)).await;
    }

    /// 停止播放
    ///
    /// 停止活动 source（抑制其完成通知），推进栅栏，回到 `Idle`。重复调用无副作用。
    pub fn stop(&self) {
        let mut inner = self.lock();
        self.stop_locked(&mut inner);
    }

    /// 卡片切换时的清理：停止播放，之后的朗读请求全部忽略
    pub fn detach(&self) {
        let mut inner = self.lock();
        self.stop_locked(&mut inner);
        inner.detached = true;
    }

    fn stop_locked(&self, inner: &mut ControllerInner) {
        if let Some(source) = inner.active.take() {
            self.engine.stop(&source);
        }
        inner.fence.advance();
        if inner.state != PlaybackState::Idle {
            self.transition(inner, PlaybackState::Idle);
        }
    }

    async fn run(
        &self,
        side: Side,
        token: FenceToken,
        then: Option<Continuation>,
    ) -> Result<(), AudioError> {
        let payload = match self.card.audio(side) {
            Some(payload) => payload.clone(),
            None => {
                tracing::debug!(side = %side, "No prefetched audio, synthesizing on demand");
                self.synthesizer
                    .synthesize(&self.card.speech_text(side))
                    .await?
            }
        };

        {
            let mut inner = self.lock();
            if !inner.fence.is_current(token) {
                tracing::debug!(side = %side, token = %token, "Stale read after synthesis, dropping");
                return Ok(());
            }
            self.transition(&mut inner, PlaybackState::Decoding(side));
        }

        let buffer = self.config.decoder.decode_payload(&payload)?;

        let (source, completion) = {
            let mut inner = self.lock();
            if !inner.fence.is_current(token) {
                tracing::debug!(side = %side, token = %token, "Stale read after decoding, dropping");
                return Ok(());
            }
            self.keep_payload(side, payload);

            let source = self.engine.create_source(buffer)?;
            let completion = match self.engine.start(&source) {
                Ok(completion) => completion,
                Err(e) => {
                    self.engine.stop(&source);
                    return Err(e.into());
                }
            };
            inner.active = Some(source);
            self.transition(&mut inner, PlaybackState::Playing(side));
            (source, completion)
        };

        let controller = self.clone();
        tokio::spawn(async move {
            controller
                .watch_completion(source, token, completion, then)
                .await;
        });

        Ok(())
    }

    /// 按需合成并成功解码的载荷挂到卡片上（已有载荷时保持原值）
    fn keep_payload(&self, side: Side, payload: AudioPayload) {
        if self.card.attach_audio(side, payload) {
            tracing::debug!(side = %side, "On-demand audio attached to card");
        }
    }

    async fn watch_completion(
        self,
        source: SourceHandle,
        token: FenceToken,
        completion: PlaybackCompletion,
        then: Option<Continuation>,
    ) {
        if !completion.ended().await {
            return;
        }

        {
            let mut inner = self.lock();
            if !inner.fence.is_current(token) || inner.active != Some(source) {
                return;
            }
            inner.active = None;
            self.transition(&mut inner, PlaybackState::Idle);
        }

        if let Some(then) = then {
            then();
        }
    }

    fn fail(&self, side: Side, token: FenceToken, error: AudioError) {
        let mut inner = self.lock();
        if !inner.fence.is_current(token) {
            tracing::debug!(side = %side, error = %error, "Stale audio error swallowed");
            return;
        }

        tracing::warn!(side = %side, error = %error, "Failed to play audio");
        inner.error = Some(AUDIO_ERROR_MESSAGE.to_string());
        self.transition(&mut inner, PlaybackState::Idle);
        self.events.publish_playback_failed(AUDIO_ERROR_MESSAGE);
    }

    fn transition(&self, inner: &mut ControllerInner, next: PlaybackState) {
        tracing::debug!(from = ?inner.state, to = ?next, "Playback state changed");
        inner.state = next;
        self.events.publish_playback_state(next.as_str(), next.side());
    }
}
