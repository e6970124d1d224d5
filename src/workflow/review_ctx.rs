//! 评论处理上下文
//!
//! 封装"我正在处理哪个批次的第几条评论"这一信息

use std::fmt::Display;

/// 评论处理上下文
#[derive(Debug, Clone)]
pub struct ReviewCtx {
    /// 批次序号（仅用于日志显示）
    pub batch_index: usize,

    /// 评论在批次中的位置（从1开始）
    pub review_index: usize,

    /// 调用方提供的评论ID
    pub review_id: String,
}

impl ReviewCtx {
    /// 创建新的评论上下文
    pub fn new(batch_index: usize, review_index: usize, review_id: impl Into<String>) -> Self {
        Self {
            batch_index,
            review_index,
            review_id: review_id.into(),
        }
    }
}

impl Display for ReviewCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[批次 #{} 评论 #{} ID#{}]",
            self.batch_index, self.review_index, self.review_id
        )
    }
}
