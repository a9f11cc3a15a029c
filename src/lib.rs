//! QuickFlash - AI 闪卡生成与朗读
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Deck Context: 卡组、卡片、语音载荷
//!
//! 应用层 (application/):
//! - Ports: 端口定义（生成、合成、文本提取、历史、播放引擎、语音缓存）
//! - Audio: 卡片朗读控制器、操作栅栏、卡组预取
//! - Viewer: 当前卡组的浏览状态
//! - Export: 纯文本 / PDF 导出
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Persistence: SQLite（历史）+ Sled（语音缓存）
//! - Adapters: Gemini、离线 fake、纯文本读取、播放引擎
//! - Events: 卡组事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
