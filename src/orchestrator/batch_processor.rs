//! 批量评论处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责一个批次从输入到输出的完整处理。
//!
//! ## 核心功能
//!
//! 1. **解码**：原始输入 → `Vec<ReviewRecord>`
//! 2. **并发评分**：每条评论一个任务，使用 Semaphore 限制并发数量
//! 3. **按序重组**：按输入顺序等待任务，输出顺序与完成顺序无关
//! 4. **快速失败**：任意一条评论评分失败，立即中止其余任务并返回错误
//! 5. **编码**：`Vec<ReviewResult>` → `Payload`
//! 6. **批次统计**：评论数、句子数、无评分评论数、耗时
//!
//! ## 设计特点
//!
//! - **资源所有者**：持有进程内唯一的评分器，所有批次共用
//! - **向下委托**：单条评论的处理委托给 `workflow::ReviewAggregator`
//! - **无部分输出**：要么返回完整结果，要么返回错误

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::codec::{self, CodecOptions};
use crate::config::Config;
use crate::error::{AppResult, ConfigError, ScoringUnavailableError};
use crate::models::{DecodeFormat, EncodeFormat, Payload, RawInput, ReviewRecord, ReviewResult};
use crate::services::SentimentScorer;
use crate::utils::logging::{self, BatchStats};
use crate::workflow::{ReviewAggregator, ReviewCtx};

type ReviewTask = JoinHandle<Result<ReviewResult, ScoringUnavailableError>>;

/// 编排器选项
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// 分隔符与平均分输出选项
    pub codec: CodecOptions,
    /// 同时评分的评论数量
    pub max_concurrent_reviews: usize,
    /// 单条评论评分超时
    pub review_timeout: Option<Duration>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            codec: CodecOptions::default(),
            max_concurrent_reviews: 1,
            review_timeout: None,
        }
    }
}

impl OrchestratorOptions {
    /// 从配置构建
    pub fn from_config(config: &Config) -> Self {
        Self {
            codec: config.codec_options(),
            max_concurrent_reviews: config.max_concurrent_reviews,
            review_timeout: config.review_timeout(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.codec.delimiters.validate()?;
        if self.max_concurrent_reviews == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

/// 批次编排器
pub struct BatchOrchestrator {
    aggregator: ReviewAggregator,
    options: OrchestratorOptions,
    batch_counter: AtomicUsize,
}

impl BatchOrchestrator {
    /// 使用配置创建编排器
    pub fn new(scorer: Arc<dyn SentimentScorer>, config: &Config) -> AppResult<Self> {
        Self::with_options(scorer, OrchestratorOptions::from_config(config))
    }

    /// 使用显式选项创建编排器
    pub fn with_options(
        scorer: Arc<dyn SentimentScorer>,
        options: OrchestratorOptions,
    ) -> AppResult<Self> {
        options.validate()?;
        Ok(Self {
            aggregator: ReviewAggregator::new(scorer),
            options,
            batch_counter: AtomicUsize::new(0),
        })
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    /// 处理一个批次：解码 → 评分 → 编码
    ///
    /// # 参数
    /// - `raw`: 原始输入
    /// - `decode_format`: 输入格式
    /// - `encode_format`: 输出格式
    ///
    /// # 返回
    /// 完整的编码结果；任何错误都会中止整个批次
    pub async fn run(
        &self,
        raw: &RawInput,
        decode_format: DecodeFormat,
        encode_format: EncodeFormat,
    ) -> AppResult<Payload> {
        let batch = codec::decode(raw, decode_format, &self.options.codec.delimiters)?;
        let results = self.score_batch(batch).await?;
        let payload = codec::encode(&results, encode_format, &self.options.codec)?;
        Ok(payload)
    }

    /// 对已解码的批次评分，结果与输入一一对应、顺序一致
    pub async fn score_batch(
        &self,
        batch: Vec<ReviewRecord>,
    ) -> Result<Vec<ReviewResult>, ScoringUnavailableError> {
        let batch_index = self.batch_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let total = batch.len();
        let started = Instant::now();

        logging::log_batch_start(batch_index, total, self.options.max_concurrent_reviews);

        let handles = self.spawn_reviews(batch_index, batch);
        let results = match collect_in_order(handles).await {
            Ok(results) => results,
            Err(e) => {
                error!("[批次 {}] ❌ 评分失败，整个批次中止: {}", batch_index, e);
                return Err(e);
            }
        };

        let stats = BatchStats {
            reviews: results.len(),
            sentences: results.iter().map(ReviewResult::sentence_count).sum(),
            empty_reviews: results.iter().filter(|r| r.average_score.is_none()).count(),
        };
        logging::print_batch_stats(batch_index, &stats, started.elapsed());

        Ok(results)
    }

    /// 为每条评论创建评分任务，任务内部先获取并发许可
    fn spawn_reviews(&self, batch_index: usize, batch: Vec<ReviewRecord>) -> Vec<ReviewTask> {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_reviews));
        let timeout = self.options.review_timeout;

        batch
            .into_iter()
            .enumerate()
            .map(|(idx, record)| {
                let ctx = ReviewCtx::new(batch_index, idx + 1, record.id.clone());
                let aggregator = self.aggregator.clone();
                let semaphore = semaphore.clone();

                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|e| {
                        ScoringUnavailableError::TaskAborted {
                            review_index: ctx.review_index,
                            reason: e.to_string(),
                        }
                    })?;

                    let scoring = aggregator.aggregate(record, &ctx);
                    match timeout {
                        Some(limit) => tokio::time::timeout(limit, scoring).await.map_err(|_| {
                            ScoringUnavailableError::Timeout {
                                review_index: ctx.review_index,
                                timeout_secs: limit.as_secs(),
                            }
                        })?,
                        None => scoring.await,
                    }
                })
            })
            .collect()
    }
}

/// 按输入顺序等待任务；遇到第一个错误时中止其余任务
async fn collect_in_order(
    mut handles: Vec<ReviewTask>,
) -> Result<Vec<ReviewResult>, ScoringUnavailableError> {
    let mut results = Vec::with_capacity(handles.len());

    for i in 0..handles.len() {
        let outcome = match (&mut handles[i]).await {
            Ok(outcome) => outcome,
            Err(join_error) => Err(ScoringUnavailableError::TaskAborted {
                review_index: i + 1,
                reason: join_error.to_string(),
            }),
        };

        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                for pending in &handles[i + 1..] {
                    pending.abort();
                }
                info!("已中止 {} 个未完成的评分任务", handles.len() - i - 1);
                return Err(e);
            }
        }
    }

    Ok(results)
}
