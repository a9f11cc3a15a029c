//! Card Viewer - 当前卡组的浏览状态
//!
//! 持有当前卡组、卡片索引、翻面状态和自动朗读开关，并为正在展示的卡片
//! 绑定一个 `CardAudioController`。每次切换卡片都先解绑旧控制器（停止播放），
//! 再为新卡片创建控制器。
//!
//! 卡组加载后立即启动语音预取；预取进行中时，语音尚未就绪的一面不允许朗读。

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::audio::{
    CardAudioController, ControllerConfig, DeckPrefetchScheduler, PrefetchHandle,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{PlaybackEnginePort, SpeechSynthesizerPort};
use crate::domain::{split_concept, Card, Deck, DeckId, Side, StyleKind};
use crate::infrastructure::events::{DeckEvent, EventPublisher};

/// 当前卡片的展示数据
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub front_text: String,
    pub back_text: String,
    pub style: StyleKind,
    /// 概念卡的主题与摘要
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub front_audio_ready: bool,
    pub back_audio_ready: bool,
}

impl CardView {
    fn from_card(card: &Card) -> Self {
        let content = card.content();
        let (topic, summary) = match split_concept(&content.front_text) {
            Some((topic, summary)) if content.style == StyleKind::Concept => {
                (Some(topic.to_string()), Some(summary.to_string()))
            }
            _ => (None, None),
        };
        Self {
            front_text: content.front_text.clone(),
            back_text: content.back_text.clone(),
            style: content.style,
            topic,
            summary,
            front_audio_ready: card.has_audio(Side::Front),
            back_audio_ready: card.has_audio(Side::Back),
        }
    }
}

/// 浏览状态快照
#[derive(Debug, Clone, Serialize)]
pub struct ViewerSnapshot {
    pub deck_id: Option<DeckId>,
    pub style: Option<StyleKind>,
    pub total_cards: usize,
    pub index: usize,
    pub flipped: bool,
    pub auto_read: bool,
    pub card: Option<CardView>,
    pub playback: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking_side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub prefetching: bool,
    pub audio_ready: usize,
}

#[derive(Default)]
struct ViewerState {
    deck: Option<Arc<Deck>>,
    index: usize,
    flipped: bool,
    auto_read: bool,
    controller: Option<CardAudioController>,
    prefetch: Option<PrefetchHandle>,
}

impl ViewerState {
    fn prefetching(&self) -> bool {
        self.prefetch
            .as_ref()
            .map(PrefetchHandle::is_running)
            .unwrap_or(false)
    }

    fn require_deck(&self) -> Result<Arc<Deck>, ApplicationError> {
        self.deck.clone().ok_or_else(ApplicationError::no_deck)
    }
}

/// 卡片浏览器
pub struct CardViewer {
    state: Arc<Mutex<ViewerState>>,
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    engine: Arc<dyn PlaybackEnginePort>,
    events: Arc<EventPublisher>,
    scheduler: DeckPrefetchScheduler,
    config: ControllerConfig,
}

fn lock_state(state: &Mutex<ViewerState>) -> MutexGuard<'_, ViewerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CardViewer {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        engine: Arc<dyn PlaybackEnginePort>,
        events: Arc<EventPublisher>,
        config: ControllerConfig,
    ) -> Self {
        let scheduler = DeckPrefetchScheduler::new(synthesizer.clone(), events.clone());
        Self {
            state: Arc::new(Mutex::new(ViewerState::default())),
            synthesizer,
            engine,
            events,
            scheduler,
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewerState> {
        lock_state(&self.state)
    }

    /// 当前卡组
    pub fn deck(&self) -> Option<Arc<Deck>> {
        self.lock().deck.clone()
    }

    /// 载入新卡组：替换当前卡组，回到第一张，启动预取
    pub fn load_deck(&self, deck: Deck) -> ViewerSnapshot {
        let deck = Arc::new(deck);
        {
            let mut state = self.lock();
            state.deck = Some(deck.clone());
            self.bind_card(&mut state, &deck, 0);
            state.prefetch = Some(self.scheduler.spawn(deck.clone()));
        }

        tracing::info!(deck_id = %deck.id(), cards = deck.len(), style = %deck.style(), "Deck loaded");
        self.events.publish(DeckEvent::DeckLoaded {
            deck_id: deck.id(),
            total_cards: deck.len(),
        });

        self.snapshot()
    }

    /// 清空当前卡组
    ///
    /// 旧卡组的预取不取消，继续写入已不再展示的卡片。
    pub fn clear(&self) -> Option<DeckId> {
        let cleared = {
            let mut state = self.lock();
            if let Some(controller) = state.controller.take() {
                controller.detach();
            }
            let deck = state.deck.take();
            state.index = 0;
            state.flipped = false;
            state.prefetch = None;
            deck.map(|d| d.id())
        };

        if let Some(deck_id) = cleared {
            tracing::info!(deck_id = %deck_id, "Deck cleared");
            self.events.publish(DeckEvent::DeckCleared { deck_id });
        }
        cleared
    }

    /// 跳转到指定卡片
    pub fn go_to(&self, index: usize) -> Result<ViewerSnapshot, ApplicationError> {
        {
            let mut state = self.lock();
            let deck = state.require_deck()?;
            deck.card(index)?;
            if index != state.index {
                self.bind_card(&mut state, &deck, index);
            }
        }
        Ok(self.snapshot())
    }

    /// 下一张（已是最后一张时不动）
    pub fn next(&self) -> Result<ViewerSnapshot, ApplicationError> {
        {
            let mut state = self.lock();
            let deck = state.require_deck()?;
            let target = (state.index + 1).min(deck.len().saturating_sub(1));
            if target != state.index {
                self.bind_card(&mut state, &deck, target);
            }
        }
        Ok(self.snapshot())
    }

    /// 上一张（已是第一张时不动）
    pub fn prev(&self) -> Result<ViewerSnapshot, ApplicationError> {
        {
            let mut state = self.lock();
            let deck = state.require_deck()?;
            let target = state.index.saturating_sub(1);
            if target != state.index {
                self.bind_card(&mut state, &deck, target);
            }
        }
        Ok(self.snapshot())
    }

    /// 翻面；朗读中拒绝
    pub fn flip(&self) -> Result<ViewerSnapshot, ApplicationError> {
        let flipped = {
            let mut state = self.lock();
            state.require_deck()?;
            if let Some(controller) = &state.controller {
                if controller.speaking_side().is_some() {
                    return Err(ApplicationError::invalid_state(
                        "Cannot flip the card while reading aloud",
                    ));
                }
                controller.stop();
            }
            state.flipped = !state.flipped;
            state.flipped
        };

        let index = self.lock().index;
        self.events.publish(DeckEvent::CardFlipped { index, flipped });
        Ok(self.snapshot())
    }

    pub fn set_auto_read(&self, enabled: bool) -> ViewerSnapshot {
        self.lock().auto_read = enabled;
        tracing::debug!(enabled, "Auto read toggled");
        self.snapshot()
    }

    /// 朗读当前卡片的一面
    ///
    /// 该面正在朗读时为停止。开启自动朗读时读正面会在读完后翻面并继续读反面。
    pub async fn read(&self, side: Side) -> Result<ViewerSnapshot, ApplicationError> {
        let (controller, read_through, deck_id, index) = {
            let state = self.lock();
            let deck = state.require_deck()?;
            let controller = state
                .controller
                .clone()
                .ok_or_else(ApplicationError::no_deck)?;

            let toggling = controller.speaking_side() == Some(side);
            if !toggling && state.prefetching() && !controller.card().has_audio(side) {
                return Err(ApplicationError::invalid_state("Audio is loading"));
            }

            let read_through = state.auto_read && side == Side::Front && !toggling;
            (controller, read_through, deck.id(), state.index)
        };

        if read_through {
            let state = self.state.clone();
            let events = self.events.clone();
            controller
                .read_through(Box::new(move || {
                    flip_to_back(&state, &events, deck_id, index);
                }))
                .await;
        } else {
            controller.read_aloud(side, None).await;
        }

        Ok(self.snapshot())
    }

    /// 停止朗读
    pub fn stop(&self) -> ViewerSnapshot {
        if let Some(controller) = self.lock().controller.clone() {
            controller.stop();
        }
        self.snapshot()
    }

    /// 等待当前预取结束
    pub async fn prefetch_settled(&self) {
        let watch = self.lock().prefetch.as_ref().map(PrefetchHandle::watch);
        if let Some(mut running) = watch {
            let _ = running.wait_for(|running| !*running).await;
        }
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        let state = self.lock();
        let deck = state.deck.as_ref();
        let controller = state.controller.as_ref();

        ViewerSnapshot {
            deck_id: deck.map(|d| d.id()),
            style: deck.map(|d| d.style()),
            total_cards: deck.map(|d| d.len()).unwrap_or(0),
            index: state.index,
            flipped: state.flipped,
            auto_read: state.auto_read,
            card: controller.map(|c| CardView::from_card(c.card())),
            playback: controller
                .map(|c| c.state().as_str())
                .unwrap_or("idle"),
            speaking_side: controller.and_then(|c| c.speaking_side()),
            error: controller.and_then(|c| c.last_error()),
            prefetching: state.prefetching(),
            audio_ready: deck.map(|d| d.audio_ready_count()).unwrap_or(0),
        }
    }

    fn bind_card(&self, state: &mut ViewerState, deck: &Arc<Deck>, index: usize) {
        if let Some(previous) = state.controller.take() {
            previous.detach();
        }

        // deck.card 已在调用方校验，空卡组不会被构造
        let Some(card) = deck.cards().get(index) else {
            return;
        };
        state.index = index;
        state.flipped = false;
        state.controller = Some(CardAudioController::new(
            card.clone(),
            self.synthesizer.clone(),
            self.engine.clone(),
            self.events.clone(),
            self.config,
        ));

        tracing::debug!(deck_id = %deck.id(), index, "Card bound");
        self.events.publish(DeckEvent::CardChanged { index });
    }
}

/// 自动朗读：正面读完后翻到反面（卡片未切换时）
fn flip_to_back(
    state: &Mutex<ViewerState>,
    events: &EventPublisher,
    deck_id: DeckId,
    index: usize,
) {
    {
        let mut state = lock_state(state);
        let same_card = state.index == index && state.deck.as_ref().map(|d| d.id()) == Some(deck_id);
        if !same_card {
            return;
        }
        state.flipped = true;
    }
    events.publish(DeckEvent::CardFlipped {
        index,
        flipped: true,
    });
}
