//! Deck Prefetch Scheduler - 卡组语音预取
//!
//! 卡组加载后立即为每张卡的两面发起合成请求，全部请求并发执行；
//! 结果按卡片顺序逐张合并回卡组，单个请求失败只影响对应的一面。

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::ports::{SpeechSynthesizerPort, SynthesisError};
use crate::domain::{AudioPayload, Card, Deck, DeckId, Side};
use crate::infrastructure::events::{DeckEvent, EventPublisher};

/// 一次预取的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    /// 本次新挂载的语音数
    pub attached: usize,
    /// 已有语音或空白文本而跳过的数量
    pub skipped: usize,
    pub failed: usize,
}

impl PrefetchReport {
    pub fn ready(&self) -> usize {
        self.attached + self.skipped
    }
}

type SideOutcome = Result<Option<AudioPayload>, SynthesisError>;

/// 正在运行的预取
///
/// 运行状态属于这一次预取本身，新卡组的预取不会被旧卡组的完成信号误判。
pub struct PrefetchHandle {
    deck_id: DeckId,
    running: watch::Receiver<bool>,
    task: JoinHandle<PrefetchReport>,
}

impl PrefetchHandle {
    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// 运行状态的订阅端，预取结束时变为 false
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.running.clone()
    }

    /// 等待预取结束
    pub async fn wait(self) -> PrefetchReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(deck_id = %self.deck_id, error = %e, "Prefetch task aborted");
                PrefetchReport::default()
            }
        }
    }
}

/// 预取调度器
#[derive(Clone)]
pub struct DeckPrefetchScheduler {
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    events: Arc<EventPublisher>,
}

impl DeckPrefetchScheduler {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizerPort>, events: Arc<EventPublisher>) -> Self {
        Self {
            synthesizer,
            events,
        }
    }

    /// 后台启动预取
    pub fn spawn(&self, deck: Arc<Deck>) -> PrefetchHandle {
        let (tx, rx) = watch::channel(true);
        let deck_id = deck.id();
        let scheduler = self.clone();

        let task = tokio::spawn(async move {
            let report = scheduler.run(deck).await;
            let _ = tx.send(false);
            report
        });

        PrefetchHandle {
            deck_id,
            running: rx,
            task,
        }
    }

    /// 预取整副卡组
    pub async fn run(&self, deck: Arc<Deck>) -> PrefetchReport {
        let deck_id = deck.id();
        tracing::info!(deck_id = %deck_id, cards = deck.len(), "Prefetching deck audio");
        self.events.publish(DeckEvent::PrefetchStarted {
            deck_id,
            total_cards: deck.len(),
        });

        // 先发出全部请求
        let pending: Vec<JoinHandle<(SideOutcome, SideOutcome)>> = deck
            .cards()
            .iter()
            .map(|card| {
                let card = card.clone();
                let synthesizer = self.synthesizer.clone();
                tokio::spawn(async move {
                    tokio::join!(
                        fetch_side(synthesizer.as_ref(), &card, Side::Front),
                        fetch_side(synthesizer.as_ref(), &card, Side::Back),
                    )
                })
            })
            .collect();

        // 再按卡片顺序合并
        let mut report = PrefetchReport::default();
        for (index, handle) in pending.into_iter().enumerate() {
            let card = &deck.cards()[index];
            match handle.await {
                Ok((front, back)) => {
                    self.merge(deck_id, index, card, Side::Front, front, &mut report);
                    self.merge(deck_id, index, card, Side::Back, back, &mut report);
                }
                Err(e) => {
                    tracing::warn!(deck_id = %deck_id, index, error = %e, "Prefetch task failed");
                    for side in [Side::Front, Side::Back] {
                        report.failed += 1;
                        self.events
                            .publish_card_audio_failed(deck_id, index, side, &e.to_string());
                    }
                }
            }
        }

        tracing::info!(
            deck_id = %deck_id,
            attached = report.attached,
            skipped = report.skipped,
            failed = report.failed,
            "Deck prefetch finished"
        );
        self.events.publish(DeckEvent::PrefetchFinished {
            deck_id,
            ready: report.ready(),
            failed: report.failed,
        });

        report
    }

    fn merge(
        &self,
        deck_id: DeckId,
        index: usize,
        card: &Card,
        side: Side,
        outcome: SideOutcome,
        report: &mut PrefetchReport,
    ) {
        match outcome {
            Ok(Some(payload)) => {
                if card.attach_audio(side, payload) {
                    report.attached += 1;
                } else {
                    report.skipped += 1;
                }
            }
            Ok(None) => report.skipped += 1,
            Err(e) => {
                tracing::warn!(
                    deck_id = %deck_id,
                    index,
                    side = %side,
                    error = %e,
                    "Failed to prefetch card audio"
                );
                report.failed += 1;
                self.events
                    .publish_card_audio_failed(deck_id, index, side, &e.to_string());
                return;
            }
        }

        if card.has_audio(side) {
            self.events.publish_card_audio_ready(deck_id, index, side);
        }
    }
}

async fn fetch_side(
    synthesizer: &dyn SpeechSynthesizerPort,
    card: &Card,
    side: Side,
) -> SideOutcome {
    if card.has_audio(side) {
        return Ok(None);
    }
    synthesizer
        .synthesize(&card.speech_text(side))
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{settle, ScriptedSynthesizer};
    use crate::domain::{CardContent, StyleKind};

    fn deck(n: usize) -> Arc<Deck> {
        let contents = (0..n)
            .map(|i| CardContent::new(format!("Q{i}"), format!("A{i}"), StyleKind::Qa))
            .collect();
        Arc::new(Deck::new(StyleKind::Qa, contents).unwrap())
    }

    fn ready_events(events: &mut tokio::sync::broadcast::Receiver<DeckEvent>) -> Vec<(usize, Side)> {
        let mut ready = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let DeckEvent::CardAudioReady { index, side, .. } = event {
                ready.push((index, side));
            }
        }
        ready
    }

    #[tokio::test]
    async fn test_prefetch_populates_every_side() {
        let synth = Arc::new(ScriptedSynthesizer::new());
        let scheduler = DeckPrefetchScheduler::new(synth.clone(), Arc::new(EventPublisher::new()));
        let deck = deck(3);

        let report = scheduler.run(deck.clone()).await;

        assert_eq!(report.attached, 6);
        assert_eq!(report.failed, 0);
        assert_eq!(deck.audio_ready_count(), 6);
        assert_eq!(synth.calls().len(), 6);
    }

    #[tokio::test]
    async fn test_results_merge_in_card_order() {
        let synth = Arc::new(ScriptedSynthesizer::new());
        let events = Arc::new(EventPublisher::new());
        let mut rx = events.subscribe();
        let scheduler = DeckPrefetchScheduler::new(synth.clone(), events);
        let deck = deck(3);
        for i in 0..3 {
            synth.hold(&format!("Q{i}"));
        }

        let handle = scheduler.spawn(deck.clone());
        settle().await;
        assert!(handle.is_running());

        // 完成顺序 2, 1, 0
        synth.release("Q2");
        settle().await;
        assert!(!deck.card(2).unwrap().has_audio(Side::Front));

        synth.release("Q1");
        settle().await;
        assert!(!deck.card(1).unwrap().has_audio(Side::Front));

        synth.release("Q0");
        let report = handle.wait().await;
        assert_eq!(report.attached, 6);

        assert_eq!(
            ready_events(&mut rx),
            vec![
                (0, Side::Front),
                (0, Side::Back),
                (1, Side::Front),
                (1, Side::Back),
                (2, Side::Front),
                (2, Side::Back),
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_one_side() {
        let synth = Arc::new(ScriptedSynthesizer::new());
        let scheduler = DeckPrefetchScheduler::new(synth.clone(), Arc::new(EventPublisher::new()));
        let deck = deck(2);
        synth.fail_on("Q1");

        let report = scheduler.run(deck.clone()).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.attached, 3);
        let card = deck.card(1).unwrap();
        assert!(!card.has_audio(Side::Front));
        assert!(card.has_audio(Side::Back));
        assert!(deck.card(0).unwrap().has_audio(Side::Front));
    }

    #[tokio::test]
    async fn test_existing_audio_is_not_refetched() {
        let synth = Arc::new(ScriptedSynthesizer::new());
        let scheduler = DeckPrefetchScheduler::new(synth.clone(), Arc::new(EventPublisher::new()));
        let deck = deck(1);
        let original = ScriptedSynthesizer::default_payload();
        deck.card(0)
            .unwrap()
            .attach_audio(Side::Front, original.clone());

        let report = scheduler.run(deck.clone()).await;

        assert_eq!(report.skipped, 1);
        assert_eq!(report.attached, 1);
        assert_eq!(synth.calls(), vec!["A0".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_side_is_skipped_not_failed() {
        let synth = Arc::new(ScriptedSynthesizer::new());
        synth.respond_with("", AudioPayload::empty());
        let scheduler = DeckPrefetchScheduler::new(synth, Arc::new(EventPublisher::new()));
        let deck = Arc::new(
            Deck::new(
                StyleKind::Qa,
                vec![CardContent::new("Q", "", StyleKind::Qa)],
            )
            .unwrap(),
        );

        let report = scheduler.run(deck.clone()).await;

        assert_eq!(report.failed, 0);
        assert_eq!(report.skipped, 1);
        assert!(!deck.card(0).unwrap().has_audio(Side::Back));
    }

    #[tokio::test]
    async fn test_handle_reports_finished() {
        let synth = Arc::new(ScriptedSynthesizer::new());
        let scheduler = DeckPrefetchScheduler::new(synth, Arc::new(EventPublisher::new()));
        let handle = scheduler.spawn(deck(1));
        let mut running = handle.watch();

        running.wait_for(|r| !*r).await.unwrap();
        assert!(!handle.is_running());
        assert_eq!(handle.wait().await.attached, 2);
    }
}
