//! Events Layer - 卡组事件推送

mod publisher;

pub use publisher::{DeckEvent, EventPublisher};
