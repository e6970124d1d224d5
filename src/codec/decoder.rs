//! 批次解码器
//!
//! 拆分时保留空字段：`id FD` 后面跟一个空文本是合法的，解码为 `raw_text = ""`。
//!
//! 组内字段数为奇数且最后一个字段为空时，视为末尾多出的终止分隔符并丢弃，
//! 这样 `1 FD 文本 FD 2 FD 文本 FD` 这种常见的写法也能正常解析。

use tracing::debug;

use crate::codec::CodecOptions;
use crate::error::MalformedBatchError;
use crate::models::{
    DecodeFormat, Delimiters, RawInput, ReviewRecord, ReviewResult, ScoreClass, SentenceScore,
};

/// 解码原始输入
///
/// # 参数
/// - `raw`: 原始输入（字符串或字符串数组）
/// - `format`: 输入格式
/// - `delimiters`: 分隔符配置（数组格式不使用）
///
/// # 返回
/// 按输入顺序排列的评论列表
pub fn decode(
    raw: &RawInput,
    format: DecodeFormat,
    delimiters: &Delimiters,
) -> Result<Vec<ReviewRecord>, MalformedBatchError> {
    let records = match (format, raw) {
        (DecodeFormat::DelimitedString, RawInput::Text(text)) => decode_delimited(text, delimiters)?,
        (DecodeFormat::ReviewGrouped, RawInput::Text(text)) => {
            decode_review_grouped(text, delimiters)?
        }
        (DecodeFormat::FlatArray, RawInput::Array(items)) => decode_flat_array(items)?,
        (DecodeFormat::FlatArray, RawInput::Text(text)) => {
            decode_flat_array(&parse_flat_array_json(text)?)?
        }
        (format, RawInput::Array(_)) => {
            return Err(MalformedBatchError::ShapeMismatch {
                format: format.as_str(),
            })
        }
    };

    debug!("解码完成: {} 条评论 (格式: {})", records.len(), format);
    Ok(records)
}

/// 把 JSON 字符串数组解析为字段列表
pub fn parse_flat_array_json(text: &str) -> Result<Vec<String>, MalformedBatchError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|source| MalformedBatchError::InvalidArray { source })
}

/// (a) id / 文本交替，评论分隔符可选
fn decode_delimited(
    text: &str,
    delimiters: &Delimiters,
) -> Result<Vec<ReviewRecord>, MalformedBatchError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    if !text.contains(delimiters.field.as_str()) {
        return Err(MalformedBatchError::MissingDelimiter {
            delimiter: delimiters.field.clone(),
        });
    }

    let groups = if text.contains(delimiters.review.as_str()) {
        split_groups(text, &delimiters.review)
    } else {
        vec![text]
    };

    let mut records = Vec::new();
    for (index, group) in groups.into_iter().enumerate() {
        let fields = split_fields(group, &delimiters.field);
        if fields.len() % 2 != 0 {
            return Err(MalformedBatchError::OddFieldCount {
                group: index + 1,
                count: fields.len(),
            });
        }
        records.extend(
            fields
                .chunks_exact(2)
                .map(|pair| ReviewRecord::new(pair[0], pair[1])),
        );
    }
    Ok(records)
}

/// (c) 每个评论分隔符之间恰好一对 id / 文本
fn decode_review_grouped(
    text: &str,
    delimiters: &Delimiters,
) -> Result<Vec<ReviewRecord>, MalformedBatchError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    if !text.contains(delimiters.review.as_str()) {
        return Err(MalformedBatchError::MissingDelimiter {
            delimiter: delimiters.review.clone(),
        });
    }

    split_groups(text, &delimiters.review)
        .into_iter()
        .enumerate()
        .map(|(index, group)| {
            let fields = split_fields(group, &delimiters.field);
            match fields.as_slice() {
                [id, raw_text] => Ok(ReviewRecord::new(*id, *raw_text)),
                _ => Err(MalformedBatchError::InvalidGroup {
                    group: index + 1,
                    count: fields.len(),
                }),
            }
        })
        .collect()
}

/// (b) 数组按位置交替 id / 文本
fn decode_flat_array(items: &[String]) -> Result<Vec<ReviewRecord>, MalformedBatchError> {
    if items.len() % 2 != 0 {
        return Err(MalformedBatchError::OddFieldCount {
            group: 1,
            count: items.len(),
        });
    }
    Ok(items
        .chunks_exact(2)
        .map(|pair| ReviewRecord::new(pair[0].as_str(), pair[1].as_str()))
        .collect())
}

/// 解码已编码的分隔符输出
///
/// 每组格式为 `id FD (句子 FD 评分 FD)* [平均分 FD]`，以评论分隔符结尾。
/// 平均分字段只做格式校验，结果中的平均分按句子重新计算。
pub fn decode_scored(
    payload: &str,
    options: &CodecOptions,
) -> Result<Vec<ReviewResult>, MalformedBatchError> {
    let delimiters = &options.delimiters;
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    if !payload.contains(delimiters.review.as_str()) {
        return Err(MalformedBatchError::MissingDelimiter {
            delimiter: delimiters.review.clone(),
        });
    }

    split_groups(payload, &delimiters.review)
        .into_iter()
        .enumerate()
        .map(|(index, group)| decode_scored_group(index + 1, group, options))
        .collect()
}

fn decode_scored_group(
    group_no: usize,
    group: &str,
    options: &CodecOptions,
) -> Result<ReviewResult, MalformedBatchError> {
    let mut fields: Vec<&str> = group.split(options.delimiters.field.as_str()).collect();
    if fields.len() > 1 && fields.last() == Some(&"") {
        fields.pop();
    }

    let id = fields.remove(0);

    if options.include_average {
        let average = fields.pop().unwrap_or_default();
        if average != "NaN" && average.parse::<f64>().is_err() {
            return Err(MalformedBatchError::InvalidAverage {
                group: group_no,
                value: average.to_string(),
            });
        }
    }

    if fields.len() % 2 != 0 {
        return Err(MalformedBatchError::OddFieldCount {
            group: group_no,
            count: fields.len(),
        });
    }

    let sentences = fields
        .chunks_exact(2)
        .map(|pair| {
            let class = pair[1]
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(ScoreClass::from_code)
                .ok_or_else(|| MalformedBatchError::InvalidScore {
                    group: group_no,
                    value: pair[1].to_string(),
                })?;
            Ok(SentenceScore::new(pair[0], class))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReviewResult::new(id, sentences))
}

// ========== 拆分辅助函数 ==========

/// 按评论分隔符拆分，末尾的空组视为终止符
fn split_groups<'a>(text: &'a str, review_delimiter: &str) -> Vec<&'a str> {
    let mut groups: Vec<&str> = text.split(review_delimiter).collect();
    if groups.len() > 1 && groups.last() == Some(&"") {
        groups.pop();
    }
    groups
}

/// 按字段分隔符拆分（保留空字段），奇数个字段且末尾为空时去掉终止符
fn split_fields<'a>(group: &'a str, field_delimiter: &str) -> Vec<&'a str> {
    let mut fields: Vec<&str> = group.split(field_delimiter).collect();
    if fields.len() % 2 == 1 && fields.last() == Some(&"") {
        fields.pop();
    }
    fields
}
