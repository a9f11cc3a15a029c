//! 概念卡正面文本
//!
//! 概念卡的正面以 `TOPIC||summary` 形式保存，展示、导出和朗读时需要拆分或清理分隔符。

/// 概念卡正面的主题/摘要分隔符
pub const CONCEPT_DELIMITER: &str = "||";

/// 拆分概念卡正面为 (topic, summary)
///
/// 不含分隔符时返回 None
pub fn split_concept(front: &str) -> Option<(&str, &str)> {
    front.split_once(CONCEPT_DELIMITER)
}

/// 朗读前的文本清理：分隔符替换为换行
pub fn to_speech_text(text: &str) -> String {
    text.replace(CONCEPT_DELIMITER, "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_concept() {
        assert_eq!(
            split_concept("PHOTOSYNTHESIS||Plants turn light into sugar"),
            Some(("PHOTOSYNTHESIS", "Plants turn light into sugar"))
        );
        assert_eq!(split_concept("What is 2 + 2?"), None);
    }

    #[test]
    fn test_speech_text_replaces_delimiter() {
        assert_eq!(to_speech_text("TOPIC||summary"), "TOPIC\nsummary");
        assert_eq!(to_speech_text("plain"), "plain");
    }
}
