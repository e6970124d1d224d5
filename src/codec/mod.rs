//! 编解码层
//!
//! 只做纯文本/数组的解析与拼接，不调用评分器，也没有任何 I/O。
//!
//! - `decoder` - 原始输入 → `Vec<ReviewRecord>`，以及已编码结果 → `Vec<ReviewResult>`
//! - `encoder` - `Vec<ReviewResult>` → `Payload`

pub mod decoder;
pub mod encoder;

use crate::models::Delimiters;

pub use decoder::{decode, decode_scored, parse_flat_array_json};
pub use encoder::encode;

/// 编解码共用选项
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodecOptions {
    pub delimiters: Delimiters,
    /// 输出中是否带上每条评论的平均分
    pub include_average: bool,
}

impl CodecOptions {
    pub fn new(delimiters: Delimiters, include_average: bool) -> Self {
        Self {
            delimiters,
            include_average,
        }
    }
}
