//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod export_queries;
mod history_queries;

pub mod handlers;

pub use export_queries::*;
pub use history_queries::*;
