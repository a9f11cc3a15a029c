//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod deck_handlers;
mod history_handlers;
mod source_handlers;

pub use deck_handlers::*;
pub use history_handlers::*;
pub use source_handlers::*;
