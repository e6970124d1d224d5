//! 评论数据模型
//!
//! 一条评论从解码到输出经历三种形态：
//! `ReviewRecord`（待评分）→ `SentenceScore`（逐句评分）→ `ReviewResult`（聚合结果）

use serde::{Deserialize, Serialize};

/// 句子情感等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ScoreClass {
    /// 负面
    Negative = 1,
    /// 中性
    Neutral = 2,
    /// 正面
    Positive = 3,
}

impl ScoreClass {
    /// 获取等级代码（1/2/3）
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 从代码解析等级
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ScoreClass::Negative),
            2 => Some(ScoreClass::Neutral),
            3 => Some(ScoreClass::Positive),
            _ => None,
        }
    }

    /// 获取标签名称
    pub fn label(self) -> &'static str {
        match self {
            ScoreClass::Negative => "negative",
            ScoreClass::Neutral => "neutral",
            ScoreClass::Positive => "positive",
        }
    }
}

impl TryFrom<u8> for ScoreClass {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        ScoreClass::from_code(code).ok_or_else(|| format!("无效的情感等级: {}", code))
    }
}

impl From<ScoreClass> for u8 {
    fn from(class: ScoreClass) -> Self {
        class.code()
    }
}

/// 待评分的评论
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    /// 调用方提供的评论ID（可能重复）
    pub id: String,
    /// 评论原文（可能为空）
    pub raw_text: String,
}

impl ReviewRecord {
    pub fn new(id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
        }
    }

    /// 原文是否为空
    pub fn is_empty_text(&self) -> bool {
        self.raw_text.is_empty()
    }
}

/// 单句评分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceScore {
    #[serde(rename = "sentence")]
    pub sentence_text: String,
    #[serde(rename = "score")]
    pub score_class: ScoreClass,
}

impl SentenceScore {
    pub fn new(sentence_text: impl Into<String>, score_class: ScoreClass) -> Self {
        Self {
            sentence_text: sentence_text.into(),
            score_class,
        }
    }
}

/// 单条评论的聚合结果
///
/// `average_score` 为 `None` 表示"无评分"（评论没有任何句子），
/// 与任何有效平均值（总在 [1, 3] 区间内）都不会混淆。
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewResult {
    pub id: String,
    pub sentences: Vec<SentenceScore>,
    pub average_score: Option<f64>,
}

impl ReviewResult {
    /// 由逐句评分构建结果，同时计算平均分
    pub fn new(id: impl Into<String>, sentences: Vec<SentenceScore>) -> Self {
        let average_score = average_of(&sentences);
        Self {
            id: id.into(),
            sentences,
            average_score,
        }
    }

    /// 没有句子的结果（空评论）
    pub fn empty(id: impl Into<String>) -> Self {
        Self::new(id, Vec::new())
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }
}

/// 计算平均情感分，没有句子时返回 `None`
pub fn average_of(sentences: &[SentenceScore]) -> Option<f64> {
    if sentences.is_empty() {
        return None;
    }
    let total: u32 = sentences
        .iter()
        .map(|s| u32::from(s.score_class.code()))
        .sum();
    Some(f64::from(total) / sentences.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_class_codes() {
        assert_eq!(ScoreClass::Negative.code(), 1);
        assert_eq!(ScoreClass::from_code(3), Some(ScoreClass::Positive));
        assert_eq!(ScoreClass::from_code(0), None);
        assert_eq!(ScoreClass::from_code(4), None);
    }

    #[test]
    fn test_average_of_three_sentences() {
        let sentences = vec![
            SentenceScore::new("a", ScoreClass::Positive),
            SentenceScore::new("b", ScoreClass::Negative),
            SentenceScore::new("c", ScoreClass::Neutral),
        ];
        assert_eq!(average_of(&sentences), Some(2.0));
    }

    #[test]
    fn test_empty_result_has_no_score() {
        let result = ReviewResult::empty("7");
        assert_eq!(result.sentence_count(), 0);
        assert_eq!(result.average_score, None);
    }

    #[test]
    fn test_sentence_score_json_shape() {
        let score: SentenceScore =
            serde_json::from_str(r#"{"sentence": "Nice.", "score": 3}"#).unwrap();
        assert_eq!(score, SentenceScore::new("Nice.", ScoreClass::Positive));

        let bad = serde_json::from_str::<SentenceScore>(r#"{"sentence": "x", "score": 5}"#);
        assert!(bad.is_err());
    }
}
