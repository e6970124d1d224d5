//! 评论聚合流程 - 流程层
//!
//! 核心职责：定义"一条评论"的完整处理流程
//!
//! 流程顺序：
//! 1. 空文本 → 直接返回无句子、无评分的结果（不调用评分器）
//! 2. 调用评分器 → 逐句评分
//! 3. 累加评分 → 计算平均分

use std::sync::Arc;
use tracing::debug;

use crate::error::ScoringUnavailableError;
use crate::models::{ReviewRecord, ReviewResult};
use crate::services::SentimentScorer;
use crate::utils::logging::truncate_text;
use crate::workflow::review_ctx::ReviewCtx;

/// 评论聚合器
///
/// - 只处理单条评论
/// - 不持有批次，不关心输出格式
/// - 评分器由外部构建后注入，克隆聚合器只克隆引用
#[derive(Clone)]
pub struct ReviewAggregator {
    scorer: Arc<dyn SentimentScorer>,
}

impl ReviewAggregator {
    /// 创建新的聚合器
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    /// 评分器名称
    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// 对一条评论评分并聚合
    ///
    /// 评分器失败时原样返回错误，由编排层中止整个批次。
    pub async fn aggregate(
        &self,
        record: ReviewRecord,
        ctx: &ReviewCtx,
    ) -> Result<ReviewResult, ScoringUnavailableError> {
        if record.is_empty_text() {
            debug!("{} 评论文本为空，跳过评分", ctx);
            return Ok(ReviewResult::empty(record.id));
        }

        debug!("{} 文本: {}", ctx, truncate_text(&record.raw_text, 80));

        let sentences = self.scorer.score(&record.raw_text).await?;

        let mut total_score = 0u32;
        for (i, sentence) in sentences.iter().enumerate() {
            total_score += u32::from(sentence.score_class.code());
            debug!(
                "{} 句子 {}: {} | 评分: {} | 累计: {}",
                ctx,
                i + 1,
                truncate_text(&sentence.sentence_text, 60),
                sentence.score_class.code(),
                total_score
            );
        }

        let result = ReviewResult::new(record.id, sentences);
        match result.average_score {
            Some(average) => debug!(
                "{} 平均分: {:.2} / 3 ({} 句)",
                ctx,
                average,
                result.sentence_count()
            ),
            None => debug!("{} 未识别出句子，无评分", ctx),
        }

        Ok(result)
    }
}
