//! # Review Sentiment
//!
//! 批量评论情感分析：逐句评分，按评论聚合，按调用方需要的格式输出
//!
//! ## 架构设计
//!
//! ### ① 数据与编解码（Models / Codec）
//! - `models/` - `ReviewRecord`、`SentenceScore`、`ReviewResult` 以及格式定义
//! - `codec/` - 纯解析与拼接，没有任何副作用
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理一段文本
//! - `SentimentScorer` - 评分能力接口
//! - `LexiconScorer` - 词典规则评分（默认）
//! - `LlmScorer` - 大模型评分
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条评论"的完整处理流程
//! - `ReviewCtx` - 上下文封装（批次序号 + 评论位置 + ID）
//! - `ReviewAggregator` - 评分 → 累加 → 平均
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 解码、并发评分、按序重组、编码
//!
//! ## 模块结构

pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use codec::CodecOptions;
pub use config::{Config, ScorerBackend};
pub use error::{
    AppError, AppResult, ConfigError, EncodeError, MalformedBatchError, ScoringUnavailableError,
};
pub use models::{
    DecodeFormat, Delimiters, EncodeFormat, Payload, RawInput, ReviewRecord, ReviewResult,
    ScoreClass, SentenceScore,
};
pub use orchestrator::{BatchOrchestrator, OrchestratorOptions};
pub use services::{build_scorer, LexiconScorer, LlmScorer, SentimentScorer};
pub use workflow::{ReviewAggregator, ReviewCtx};
