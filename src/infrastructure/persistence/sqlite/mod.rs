//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod history_store;

pub use database::*;
pub use history_store::*;
