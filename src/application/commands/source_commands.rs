//! Source Commands - 源文件文本提取

use crate::application::ports::SourceFile;

/// 从上传文件提取文本
#[derive(Debug, Clone)]
pub struct ExtractText {
    pub file: SourceFile,
}

/// 提取结果
#[derive(Debug, Clone)]
pub struct ExtractTextResponse {
    pub text: String,
}
