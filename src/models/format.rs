//! 线路格式定义
//!
//! 解码格式与编码格式是两个独立的配置项，不保证对称。

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, EncodeError};

/// 默认字段分隔符
pub const DEFAULT_FIELD_DELIMITER: &str = "!#delimiter#!";
/// 默认评论分隔符
pub const DEFAULT_REVIEW_DELIMITER: &str = "!#reviewDelimiter#!";

/// 输入格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodeFormat {
    /// 单个字符串，id / 文本交替出现，可选用评论分隔符分组
    DelimitedString,
    /// 单个字符串，每个评论分隔符之间恰好一对 id / 文本
    ReviewGrouped,
    /// 字符串数组，按位置交替 id / 文本
    FlatArray,
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodeFormat {
    /// `id FD (句子 FD 评分 FD)* RD`
    DelimitedString,
    /// `[[id, 句子, 评分, ...], ...]`
    NestedArray,
    /// 单条评论的平均分
    ScalarAverage,
}

impl DecodeFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeFormat::DelimitedString => "delimited-string",
            DecodeFormat::ReviewGrouped => "review-grouped",
            DecodeFormat::FlatArray => "flat-array",
        }
    }
}

impl EncodeFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            EncodeFormat::DelimitedString => "delimited-string",
            EncodeFormat::NestedArray => "nested-array",
            EncodeFormat::ScalarAverage => "scalar-average",
        }
    }
}

impl FromStr for DecodeFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "delimited-string" => Ok(DecodeFormat::DelimitedString),
            "review-grouped" => Ok(DecodeFormat::ReviewGrouped),
            "flat-array" => Ok(DecodeFormat::FlatArray),
            other => Err(ConfigError::UnknownValue {
                kind: "输入格式",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for EncodeFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "delimited-string" => Ok(EncodeFormat::DelimitedString),
            "nested-array" => Ok(EncodeFormat::NestedArray),
            "scalar-average" => Ok(EncodeFormat::ScalarAverage),
            other => Err(ConfigError::UnknownValue {
                kind: "输出格式",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DecodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EncodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 字段分隔符与评论分隔符
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub field: String,
    pub review: String,
}

impl Delimiters {
    /// 创建并校验分隔符
    pub fn new(field: impl Into<String>, review: impl Into<String>) -> Result<Self, ConfigError> {
        let delimiters = Self {
            field: field.into(),
            review: review.into(),
        };
        delimiters.validate()?;
        Ok(delimiters)
    }

    /// 两个分隔符都不能为空，且不能互相包含，否则拆分结果不确定
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field.is_empty() {
            return Err(ConfigError::EmptyDelimiter { name: "field" });
        }
        if self.review.is_empty() {
            return Err(ConfigError::EmptyDelimiter { name: "review" });
        }
        if self.field.contains(&self.review) || self.review.contains(&self.field) {
            return Err(ConfigError::OverlappingDelimiters {
                field: self.field.clone(),
                review: self.review.clone(),
            });
        }
        Ok(())
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: DEFAULT_FIELD_DELIMITER.to_string(),
            review: DEFAULT_REVIEW_DELIMITER.to_string(),
        }
    }
}

/// 原始批次输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// 分隔符拼接的字符串
    Text(String),
    /// 按位置交替的字符串数组
    Array(Vec<String>),
}

impl From<&str> for RawInput {
    fn from(s: &str) -> Self {
        RawInput::Text(s.to_string())
    }
}

impl From<String> for RawInput {
    fn from(s: String) -> Self {
        RawInput::Text(s)
    }
}

impl From<Vec<String>> for RawInput {
    fn from(items: Vec<String>) -> Self {
        RawInput::Array(items)
    }
}

/// 编码后的输出
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 分隔符拼接的字符串
    Delimited(String),
    /// 每条评论一个数组
    Nested(Vec<Vec<JsonValue>>),
    /// 单条评论的平均分，`None` 表示无评分
    Scalar(Option<f64>),
}

impl Payload {
    /// 渲染为写给调用方的文本
    ///
    /// 无评分在文本中渲染为 `NaN`，在 JSON 中渲染为 `null`。
    pub fn to_wire_string(&self) -> Result<String, EncodeError> {
        match self {
            Payload::Delimited(text) => Ok(text.clone()),
            Payload::Nested(rows) => Ok(serde_json::to_string(rows)?),
            Payload::Scalar(average) => Ok(render_average(*average)),
        }
    }
}

/// 平均分的文本形式，整数值也保留小数点（`2.0`）
pub fn render_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{:?}", value),
        None => "NaN".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_parse() {
        assert_eq!(
            "flat-array".parse::<DecodeFormat>().unwrap(),
            DecodeFormat::FlatArray
        );
        assert_eq!(
            "scalar-average".parse::<EncodeFormat>().unwrap(),
            EncodeFormat::ScalarAverage
        );
        assert!("csv".parse::<DecodeFormat>().is_err());
    }

    #[test]
    fn test_delimiters_reject_overlap() {
        assert!(Delimiters::new("|", "||").is_err());
        assert!(Delimiters::new("", "#").is_err());
        assert!(Delimiters::new("|", "#").is_ok());
        assert!(Delimiters::default().validate().is_ok());
    }

    #[test]
    fn test_scalar_payload_renders_nan_for_no_score() {
        assert_eq!(Payload::Scalar(None).to_wire_string().unwrap(), "NaN");
        assert_eq!(Payload::Scalar(Some(2.5)).to_wire_string().unwrap(), "2.5");
    }

    #[test]
    fn test_whole_average_keeps_decimal_point() {
        assert_eq!(render_average(Some(2.0)), "2.0");
        assert_eq!(render_average(Some(3.0)), "3.0");
        assert_eq!(Payload::Scalar(Some(1.0)).to_wire_string().unwrap(), "1.0");
    }
}
