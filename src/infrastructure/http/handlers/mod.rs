//! HTTP Handlers

mod deck;
mod history;
mod ping;
mod source;
mod viewer;
mod websocket;

pub use deck::*;
pub use history::*;
pub use ping::*;
pub use source::*;
pub use viewer::*;
pub use websocket::*;
