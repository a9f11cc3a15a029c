//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod export_handlers;
mod history_handlers;

pub use export_handlers::*;
pub use history_handlers::*;
