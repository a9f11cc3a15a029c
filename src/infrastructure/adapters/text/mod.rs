//! Text Adapter - 本地文本文件读取

mod plain_text;

pub use plain_text::PlainTextExtractor;
