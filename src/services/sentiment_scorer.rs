//! 情感评分能力 - 业务能力层
//!
//! 评分器只描述"给一段文本，返回逐句评分"这一个能力，不关心批次和格式。
//! 任何 NLP 引擎（规则、统计、远程模型）都可以通过实现 `SentimentScorer` 接入。

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, ScorerBackend};
use crate::error::ScoringUnavailableError;
use crate::models::SentenceScore;
use crate::services::{LexiconScorer, LlmScorer};

/// 评分结果
pub type ScoreResult = Result<Vec<SentenceScore>, ScoringUnavailableError>;

/// 情感评分器
///
/// 约定：
/// - 同一段文本总是得到相同的分句和评分
/// - 空文本返回空列表
/// - 构建一次，在整个进程内复用；实现必须可以安全地被多个批次并发调用
pub trait SentimentScorer: Send + Sync {
    /// 后端名称（用于日志和错误信息）
    fn name(&self) -> &str;

    /// 对一段文本分句并逐句评分，句子按原文从左到右排列
    fn score<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ScoreResult>;
}

/// 按配置构建评分器
///
/// 这是进程内唯一构建评分器的地方，构建失败即为致命错误。
pub fn build_scorer(config: &Config) -> Result<Arc<dyn SentimentScorer>, ScoringUnavailableError> {
    info!("🔧 正在初始化评分器: {}", config.scorer_backend);

    let scorer: Arc<dyn SentimentScorer> = match config.scorer_backend {
        ScorerBackend::Lexicon => Arc::new(LexiconScorer::new(config.neutral_threshold)?),
        ScorerBackend::Llm => Arc::new(LlmScorer::new(config)?),
    };

    info!("✓ 评分器 {} 初始化完成", scorer.name());
    Ok(scorer)
}
