/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数。
/// 标准输出只留给编码结果，日志一律写到标准错误。
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// # 参数
/// - `verbose`: 为 true 时默认级别为 debug，否则为 info；`RUST_LOG` 优先
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 评论情感批量分析");
    info!(
        "📥 输入格式: {} | 📤 输出格式: {}",
        config.decode_format, config.encode_format
    );
    info!(
        "🔧 评分器: {} | 📊 最大并发数: {}",
        config.scorer_backend, config.max_concurrent_reviews
    );
    if let Some(limit) = config.review_timeout() {
        info!("⏱️ 单条评论超时: {} 秒", limit.as_secs());
    }
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_index`: 批次序号
/// - `total`: 评论总数
/// - `max_concurrent`: 最大并发数
pub fn log_batch_start(batch_index: usize, total: usize, max_concurrent: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 [批次 {}] 开始处理", batch_index);
    info!(
        "📄 [批次 {}] 评论总数: {} / 并发数: {}",
        batch_index, total, max_concurrent
    );
    info!("{}", "=".repeat(60));
}

/// 批次统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    /// 评论数
    pub reviews: usize,
    /// 句子总数
    pub sentences: usize,
    /// 空评论数（无评分）
    pub empty_reviews: usize,
}

/// 打印批次统计信息
///
/// # 参数
/// - `batch_index`: 批次序号
/// - `stats`: 统计数据
/// - `elapsed`: 耗时
pub fn print_batch_stats(batch_index: usize, stats: &BatchStats, elapsed: Duration) {
    info!("\n{}", "─".repeat(60));
    info!("📊 [批次 {}] 处理完成统计", batch_index);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 评论: {}", stats.reviews);
    info!("📝 句子: {}", stats.sentences);
    info!("⚪ 无评分评论: {}", stats.empty_reviews);
    info!("⏱️ 耗时: {:.2?}", elapsed);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
