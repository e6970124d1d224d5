//! 批次编码器

use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::codec::CodecOptions;
use crate::error::EncodeError;
use crate::models::format::render_average;
use crate::models::{EncodeFormat, Payload, ReviewResult};

/// 按指定格式编码评分结果
///
/// # 参数
/// - `results`: 按输入顺序排列的评分结果
/// - `format`: 输出格式
/// - `options`: 分隔符与是否输出平均分
pub fn encode(
    results: &[ReviewResult],
    format: EncodeFormat,
    options: &CodecOptions,
) -> Result<Payload, EncodeError> {
    let payload = match format {
        EncodeFormat::DelimitedString => encode_delimited(results, options)?,
        EncodeFormat::NestedArray => encode_nested(results, options.include_average),
        EncodeFormat::ScalarAverage => encode_scalar(results)?,
    };
    debug!("编码完成: {} 条评论 (格式: {})", results.len(), format);
    Ok(payload)
}

/// `id FD (句子 FD 评分 FD)* [平均分 FD] RD`
fn encode_delimited(
    results: &[ReviewResult],
    options: &CodecOptions,
) -> Result<Payload, EncodeError> {
    let fd = options.delimiters.field.as_str();
    let rd = options.delimiters.review.as_str();
    let mut out = String::new();

    for result in results {
        ensure_no_delimiter(&result.id, &result.id, options)?;
        out.push_str(&result.id);
        out.push_str(fd);

        for sentence in &result.sentences {
            ensure_no_delimiter(&result.id, &sentence.sentence_text, options)?;
            out.push_str(&sentence.sentence_text);
            out.push_str(fd);
            out.push_str(&sentence.score_class.code().to_string());
            out.push_str(fd);
        }

        if options.include_average {
            out.push_str(&render_average(result.average_score));
            out.push_str(fd);
        }
        out.push_str(rd);
    }

    Ok(Payload::Delimited(out))
}

/// `[[id, 句子, 评分, ..., (平均分)], ...]`
fn encode_nested(results: &[ReviewResult], include_average: bool) -> Payload {
    let rows = results
        .iter()
        .map(|result| {
            let mut row: Vec<JsonValue> = Vec::with_capacity(1 + result.sentences.len() * 2);
            row.push(json!(result.id));
            for sentence in &result.sentences {
                row.push(json!(sentence.sentence_text));
                row.push(json!(sentence.score_class.code()));
            }
            if include_average {
                row.push(json!(result.average_score));
            }
            row
        })
        .collect();
    Payload::Nested(rows)
}

fn encode_scalar(results: &[ReviewResult]) -> Result<Payload, EncodeError> {
    match results {
        [only] => Ok(Payload::Scalar(only.average_score)),
        _ => Err(EncodeError::ScalarRequiresSingleReview {
            count: results.len(),
        }),
    }
}

/// 内容里出现分隔符会让输出无法被正确拆分
fn ensure_no_delimiter(id: &str, text: &str, options: &CodecOptions) -> Result<(), EncodeError> {
    let delimiters = &options.delimiters;
    for delimiter in [&delimiters.field, &delimiters.review] {
        if text.contains(delimiter.as_str()) {
            return Err(EncodeError::DelimiterCollision {
                id: id.to_string(),
                delimiter: delimiter.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Delimiters, ScoreClass, SentenceScore};

    fn sample() -> Vec<ReviewResult> {
        vec![
            ReviewResult::new("1", vec![SentenceScore::new("Good.", ScoreClass::Positive)]),
            ReviewResult::new(
                "2",
                vec![
                    SentenceScore::new("Bad.", ScoreClass::Negative),
                    SentenceScore::new("Very bad.", ScoreClass::Negative),
                ],
            ),
            ReviewResult::empty("3"),
        ]
    }

    fn short_delimiters() -> CodecOptions {
        CodecOptions::new(Delimiters::new("|", "#").unwrap(), false)
    }

    #[test]
    fn test_encode_delimited_layout() {
        let payload = encode(&sample(), EncodeFormat::DelimitedString, &short_delimiters()).unwrap();
        assert_eq!(
            payload,
            Payload::Delimited("1|Good.|3|#2|Bad.|1|Very bad.|1|#3|#".to_string())
        );
    }

    #[test]
    fn test_encode_delimited_with_average() {
        let mut options = short_delimiters();
        options.include_average = true;
        let payload = encode(&sample()[2..], EncodeFormat::DelimitedString, &options).unwrap();
        assert_eq!(payload, Payload::Delimited("3|NaN|#".to_string()));

        let payload = encode(&sample()[..1], EncodeFormat::DelimitedString, &options).unwrap();
        assert_eq!(payload, Payload::Delimited("1|Good.|3|3.0|#".to_string()));
    }

    #[test]
    fn test_encode_nested_rows() {
        let payload = encode(&sample(), EncodeFormat::NestedArray, &short_delimiters()).unwrap();
        let Payload::Nested(rows) = payload else {
            panic!("应为嵌套数组");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![json!("2"), json!("Bad."), json!(1), json!("Very bad."), json!(1)]);
        assert_eq!(rows[2], vec![json!("3")]);
    }

    #[test]
    fn test_encode_nested_average_is_null_without_sentences() {
        let mut options = short_delimiters();
        options.include_average = true;
        let payload = encode(&sample(), EncodeFormat::NestedArray, &options).unwrap();
        assert_eq!(
            payload.to_wire_string().unwrap(),
            r#"[["1","Good.",3,3.0],["2","Bad.",1,"Very bad.",1,1.0],["3",null]]"#
        );
    }

    #[test]
    fn test_encode_scalar_requires_single_review() {
        let err = encode(&sample(), EncodeFormat::ScalarAverage, &short_delimiters()).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ScalarRequiresSingleReview { count: 3 }
        ));

        let one = &sample()[1..2];
        let payload = encode(one, EncodeFormat::ScalarAverage, &short_delimiters()).unwrap();
        assert_eq!(payload, Payload::Scalar(Some(1.0)));
    }

    #[test]
    fn test_encode_rejects_delimiter_in_sentence() {
        let results = vec![ReviewResult::new(
            "1",
            vec![SentenceScore::new("a|b", ScoreClass::Neutral)],
        )];
        let err = encode(&results, EncodeFormat::DelimitedString, &short_delimiters()).unwrap_err();
        assert!(matches!(err, EncodeError::DelimiterCollision { .. }));
    }
}
