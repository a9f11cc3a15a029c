//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod deck_commands;
mod history_commands;
mod source_commands;

pub mod handlers;

pub use deck_commands::*;
pub use history_commands::*;
pub use source_commands::*;
