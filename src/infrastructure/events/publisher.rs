//! Event Publisher Implementation
//!
//! 卡组事件推送（WebSocket 转发）。预取调度器通过 "card i audio ready"
//! 事件通知视图层，播放控制器推送状态变更。

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::{DeckId, Side};

/// 卡组事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum DeckEvent {
    /// 新卡组成为当前卡组
    DeckLoaded {
        deck_id: DeckId,
        total_cards: usize,
    },
    /// 当前卡组被清空（Generate Next Set）
    DeckCleared {
        deck_id: DeckId,
    },
    /// 预取开始
    PrefetchStarted {
        deck_id: DeckId,
        total_cards: usize,
    },
    /// 某张卡某一面的语音已挂载
    CardAudioReady {
        deck_id: DeckId,
        index: usize,
        side: Side,
    },
    /// 某张卡某一面的语音预取失败
    CardAudioFailed {
        deck_id: DeckId,
        index: usize,
        side: Side,
        error: String,
    },
    /// 预取结束
    PrefetchFinished {
        deck_id: DeckId,
        ready: usize,
        failed: usize,
    },
    /// 当前卡片切换
    CardChanged {
        index: usize,
    },
    /// 卡片翻面
    CardFlipped {
        index: usize,
        flipped: bool,
    },
    /// 播放状态变更
    PlaybackStateChanged {
        state: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        side: Option<Side>,
    },
    /// 播放失败（用户可见）
    PlaybackFailed {
        message: String,
    },
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<DeckEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全部事件
    pub fn subscribe(&self) -> broadcast::Receiver<DeckEvent> {
        self.channel.subscribe()
    }

    pub fn publish(&self, event: DeckEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(error = %e, "No event receivers");
        }
    }

    pub fn publish_card_audio_ready(&self, deck_id: DeckId, index: usize, side: Side) {
        self.publish(DeckEvent::CardAudioReady {
            deck_id,
            index,
            side,
        });
    }

    pub fn publish_card_audio_failed(
        &self,
        deck_id: DeckId,
        index: usize,
        side: Side,
        error: &str,
    ) {
        self.publish(DeckEvent::CardAudioFailed {
            deck_id,
            index,
            side,
            error: error.to_string(),
        });
    }

    pub fn publish_playback_state(&self, state: &str, side: Option<Side>) {
        self.publish(DeckEvent::PlaybackStateChanged {
            state: state.to_string(),
            side,
        });
    }

    pub fn publish_playback_failed(&self, message: &str) {
        self.publish(DeckEvent::PlaybackFailed {
            message: message.to_string(),
        });
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe();
        let deck_id = DeckId::new();

        publisher.publish_card_audio_ready(deck_id, 2, Side::Back);

        assert_eq!(
            rx.recv().await.unwrap(),
            DeckEvent::CardAudioReady {
                deck_id,
                index: 2,
                side: Side::Back
            }
        );
    }

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let publisher = EventPublisher::new();
        publisher.publish_playback_failed("Could not play audio");
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(DeckEvent::PlaybackStateChanged {
            state: "idle".to_string(),
            side: None,
        })
        .unwrap();
        assert_eq!(json["event"], "PlaybackStateChanged");
        assert_eq!(json["data"]["state"], "idle");
        assert!(json["data"].get("side").is_none());
    }
}
