//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次处理和任务调度，是整个系统的"指挥中心"。
//!
//! ### `batch_processor` - 批量评论处理器
//! - 解码原始输入（Vec<ReviewRecord>）
//! - 控制并发数量（Semaphore）
//! - 持有评分器资源（Arc<dyn SentimentScorer>）
//! - 按输入顺序重组结果并编码
//! - 输出批次统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ReviewRecord>)
//!     ↓
//! workflow::ReviewAggregator (处理单条评论)
//!     ↓
//! services (能力层：SentimentScorer)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：编排层只管批次，聚合器只管单条评论
//! 2. **资源隔离**：只有编排层持有评分器
//! 3. **向下依赖**：编排层 → workflow → services
//! 4. **无业务逻辑**：只做调度和统计，不做评分判断

pub mod batch_processor;

// 重新导出主要类型
pub use batch_processor::{BatchOrchestrator, OrchestratorOptions};
