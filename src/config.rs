use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::codec::CodecOptions;
use crate::error::ConfigError;
use crate::models::{
    DecodeFormat, Delimiters, EncodeFormat, DEFAULT_FIELD_DELIMITER, DEFAULT_REVIEW_DELIMITER,
};

/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "REVIEW_SENTIMENT_CONFIG";

/// 评分器后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerBackend {
    /// 基于词典的规则评分（默认）
    Lexicon,
    /// 兼容 OpenAI API 的大模型评分
    Llm,
}

impl ScorerBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            ScorerBackend::Lexicon => "lexicon",
            ScorerBackend::Llm => "llm",
        }
    }
}

impl FromStr for ScorerBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicon" => Ok(ScorerBackend::Lexicon),
            "llm" => Ok(ScorerBackend::Llm),
            other => Err(ConfigError::UnknownValue {
                kind: "评分器后端",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ScorerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 程序配置
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 输入格式
    pub decode_format: DecodeFormat,
    /// 输出格式
    pub encode_format: EncodeFormat,
    /// 字段分隔符
    pub field_delimiter: String,
    /// 评论分隔符
    pub review_delimiter: String,
    /// 输出中是否带平均分
    pub include_average: bool,
    /// 同时评分的评论数量，1 表示逐条顺序处理
    pub max_concurrent_reviews: usize,
    /// 单条评论评分超时（秒），不设置或为 0 则不限时
    pub review_timeout_secs: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 评分器后端
    pub scorer_backend: ScorerBackend,
    /// 词典评分的中性区间半宽
    pub neutral_threshold: f64,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decode_format: DecodeFormat::DelimitedString,
            encode_format: EncodeFormat::DelimitedString,
            field_delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
            review_delimiter: DEFAULT_REVIEW_DELIMITER.to_string(),
            include_average: false,
            max_concurrent_reviews: 4,
            review_timeout_secs: None,
            verbose_logging: false,
            scorer_backend: ScorerBackend::Lexicon,
            neutral_threshold: 0.25,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：配置文件（若设置了 `REVIEW_SENTIMENT_CONFIG`）→ 环境变量覆盖 → 校验
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(path.trim())?,
            _ => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 只从环境变量读取，未设置的字段使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: String::new(),
            source,
        })
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            decode_format: env_parse("DECODE_FORMAT", "输入格式")?.unwrap_or(self.decode_format),
            encode_format: env_parse("ENCODE_FORMAT", "输出格式")?.unwrap_or(self.encode_format),
            field_delimiter: env_string("FIELD_DELIMITER").unwrap_or(self.field_delimiter),
            review_delimiter: env_string("REVIEW_DELIMITER").unwrap_or(self.review_delimiter),
            include_average: env_parse("INCLUDE_AVERAGE", "bool")?.unwrap_or(self.include_average),
            max_concurrent_reviews: env_parse("MAX_CONCURRENT_REVIEWS", "usize")?
                .unwrap_or(self.max_concurrent_reviews),
            review_timeout_secs: match env_parse::<u64>("REVIEW_TIMEOUT_SECS", "u64")? {
                Some(0) => None,
                Some(secs) => Some(secs),
                None => self.review_timeout_secs,
            },
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            scorer_backend: env_parse("SCORER_BACKEND", "评分器后端")?
                .unwrap_or(self.scorer_backend),
            neutral_threshold: env_parse("NEUTRAL_THRESHOLD", "f64")?
                .unwrap_or(self.neutral_threshold),
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
        })
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.delimiters().validate()?;
        if self.max_concurrent_reviews == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if !self.neutral_threshold.is_finite() || self.neutral_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.neutral_threshold));
        }
        Ok(())
    }

    /// 分隔符（未校验）
    pub fn delimiters(&self) -> Delimiters {
        Delimiters {
            field: self.field_delimiter.clone(),
            review: self.review_delimiter.clone(),
        }
    }

    /// 编解码选项
    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions::new(self.delimiters(), self.include_average)
    }

    /// 单条评论超时，0 秒视为不限时
    pub fn review_timeout(&self) -> Option<Duration> {
        self.review_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

// ========== 环境变量辅助函数 ==========

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok()
}

fn env_parse<T: FromStr>(
    var_name: &str,
    expected_type: &'static str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }),
        Err(_) => Ok(None),
    }
}
