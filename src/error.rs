use thiserror::Error;

/// 装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
///
/// 所有错误都会中止整个批次，不做重试，也不输出部分结果。
#[derive(Debug, Error)]
pub enum AppError {
    /// 批次输入结构错误
    #[error("批次格式错误: {0}")]
    Malformed(#[from] MalformedBatchError),
    /// 评分器不可用（初始化或调用失败）
    #[error("评分服务不可用: {0}")]
    ScoringUnavailable(#[from] ScoringUnavailableError),
    /// 结果编码失败
    #[error("编码错误: {0}")]
    Encode(#[from] EncodeError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 解码阶段的结构错误
#[derive(Debug, Error)]
pub enum MalformedBatchError {
    /// 字段数无法两两配对
    #[error("第 {group} 组共有 {count} 个字段，无法按 id/文本 配对")]
    OddFieldCount { group: usize, count: usize },
    /// 声明使用的分隔符没有出现
    #[error("输入中未找到必需的分隔符 '{delimiter}'")]
    MissingDelimiter { delimiter: String },
    /// 按评论分组的输入中，某组不是恰好一条评论
    #[error("第 {group} 组应恰好包含一对 id/文本，实际字段数 {count}")]
    InvalidGroup { group: usize, count: usize },
    /// 评分字段不是 1/2/3
    #[error("第 {group} 组中的评分 '{value}' 不是有效的情感等级 (1/2/3)")]
    InvalidScore { group: usize, value: String },
    /// 平均分字段无法解析
    #[error("第 {group} 组中的平均分 '{value}' 无法解析")]
    InvalidAverage { group: usize, value: String },
    /// 数组输入不是字符串数组
    #[error("数组输入无法解析: {source}")]
    InvalidArray { source: serde_json::Error },
    /// 输入形态与声明的格式不符
    #[error("输入形态与格式 {format} 不符")]
    ShapeMismatch { format: &'static str },
}

/// 评分器错误
#[derive(Debug, Error)]
pub enum ScoringUnavailableError {
    /// 评分器构建失败
    #[error("评分器 {backend} 初始化失败: {source}")]
    ConstructionFailed { backend: String, source: BoxError },
    /// 评分器调用失败
    #[error("评分器 {backend} 调用失败: {source}")]
    InvocationFailed { backend: String, source: BoxError },
    /// 评分器返回的内容无法使用
    #[error("评分器 {backend} 返回了无法解析的结果: {reason}")]
    InvalidResponse { backend: String, reason: String },
    /// 单条评论评分超时
    #[error("评论 #{review_index} 评分超时 ({timeout_secs} 秒)")]
    Timeout {
        review_index: usize,
        timeout_secs: u64,
    },
    /// 评分任务异常终止
    #[error("评论 #{review_index} 的评分任务异常终止: {reason}")]
    TaskAborted { review_index: usize, reason: String },
}

/// 编码阶段错误
#[derive(Debug, Error)]
pub enum EncodeError {
    /// 标量格式只能输出单条评论
    #[error("标量输出要求批次中恰好一条评论，实际 {count} 条")]
    ScalarRequiresSingleReview { count: usize },
    /// 内容中出现了分隔符，输出会产生歧义
    #[error("评论 {id} 的内容包含分隔符 '{delimiter}'，无法安全编码")]
    DelimiterCollision { id: String, delimiter: String },
    /// JSON 序列化失败
    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 分隔符为空
    #[error("分隔符 {name} 不能为空")]
    EmptyDelimiter { name: &'static str },
    /// 两个分隔符相同或互相包含
    #[error("字段分隔符 '{field}' 与评论分隔符 '{review}' 相同或互相包含")]
    OverlappingDelimiters { field: String, review: String },
    /// 并发数为 0
    #[error("max_concurrent_reviews 必须大于 0")]
    ZeroConcurrency,
    /// 中性阈值无效
    #[error("neutral_threshold 必须是非负有限数，实际为 {0}")]
    InvalidThreshold(f64),
    /// 无法识别的取值
    #[error("未知的{kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl ScoringUnavailableError {
    /// 创建评分器初始化错误
    pub fn construction_failed(
        backend: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        ScoringUnavailableError::ConstructionFailed {
            backend: backend.into(),
            source: source.into(),
        }
    }

    /// 创建评分器调用错误
    pub fn invocation_failed(backend: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ScoringUnavailableError::InvocationFailed {
            backend: backend.into(),
            source: source.into(),
        }
    }

    /// 创建结果无法解析错误
    pub fn invalid_response(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        ScoringUnavailableError::InvalidResponse {
            backend: backend.into(),
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
