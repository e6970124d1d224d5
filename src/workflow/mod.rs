pub mod review_aggregator;
pub mod review_ctx;

pub use review_aggregator::ReviewAggregator;
pub use review_ctx::ReviewCtx;
