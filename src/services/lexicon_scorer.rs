//! 词典评分器 - 业务能力层
//!
//! 基于规则的默认评分器：
//! 1. 按句末标点分句
//! 2. 查词典得到每个词的极性
//! 3. 否定词翻转下一个情感词，程度副词放大/缩小下一个情感词
//! 4. 句子极性超出中性区间即判为正面/负面
//!
//! 构建后不可变，可以被任意多个批次同时使用。

use futures::future::{BoxFuture, FutureExt};
use phf::{phf_map, phf_set};
use regex::Regex;
use tracing::debug;

use crate::error::ScoringUnavailableError;
use crate::models::{ScoreClass, SentenceScore};
use crate::services::sentiment_scorer::{ScoreResult, SentimentScorer};

const BACKEND_NAME: &str = "lexicon";

/// 句子：一段非句末标点的文本，后接句末标点（可带右引号/右括号）或文本结尾
const SENTENCE_PATTERN: &str = r#"[^.!?]+(?:[.!?]+["'”’)\]]*|$)"#;
/// 词：字母与撇号
const WORD_PATTERN: &str = r"[A-Za-z]+(?:['’][A-Za-z]+)*";

static WORD_SCORES: phf::Map<&'static str, f64> = phf_map! {
    // 正面
    "good" => 0.6,
    "great" => 0.8,
    "excellent" => 0.9,
    "amazing" => 0.9,
    "awesome" => 0.8,
    "fantastic" => 0.9,
    "perfect" => 0.9,
    "best" => 0.8,
    "love" => 0.8,
    "loved" => 0.8,
    "like" => 0.4,
    "nice" => 0.5,
    "helpful" => 0.6,
    "useful" => 0.5,
    "easy" => 0.5,
    "recommend" => 0.6,
    "happy" => 0.6,
    "enjoy" => 0.6,
    "fun" => 0.5,
    "fast" => 0.4,
    "smooth" => 0.5,
    "reliable" => 0.6,
    "beautiful" => 0.7,
    "wonderful" => 0.8,
    "intuitive" => 0.5,
    "works" => 0.3,
    "thanks" => 0.4,
    "brilliant" => 0.8,
    // 负面
    "bad" => -0.6,
    "terrible" => -0.9,
    "awful" => -0.9,
    "horrible" => -0.9,
    "worst" => -0.9,
    "hate" => -0.8,
    "poor" => -0.6,
    "useless" => -0.8,
    "broken" => -0.7,
    "crash" => -0.7,
    "crashes" => -0.7,
    "bug" => -0.5,
    "buggy" => -0.6,
    "slow" => -0.5,
    "annoying" => -0.6,
    "waste" => -0.7,
    "disappointing" => -0.7,
    "disappointed" => -0.7,
    "boring" => -0.5,
    "difficult" => -0.4,
    "problem" => -0.5,
    "fail" => -0.7,
    "fails" => -0.7,
    "error" => -0.5,
    "laggy" => -0.6,
    "freezes" => -0.6,
    "ugly" => -0.6,
    "scam" => -0.9,
    "refund" => -0.5,
    "uninstall" => -0.6,
};

static NEGATIONS: phf::Set<&'static str> = phf_set! {
    "not", "no", "never", "neither", "nobody", "nothing", "none", "cannot", "can't", "cant",
    "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "won't", "wont",
    "isn't", "isnt", "aren't", "arent", "wasn't", "wasnt", "weren't", "werent",
    "hardly", "barely",
};

static INTENSIFIERS: phf::Map<&'static str, f64> = phf_map! {
    "very" => 1.5,
    "really" => 1.5,
    "extremely" => 2.0,
    "so" => 1.3,
    "super" => 1.5,
    "totally" => 1.5,
    "absolutely" => 1.8,
    "slightly" => 0.5,
    "somewhat" => 0.7,
    "quite" => 1.2,
};

/// 词典评分器
pub struct LexiconScorer {
    sentence_re: Regex,
    word_re: Regex,
    neutral_threshold: f64,
}

impl LexiconScorer {
    /// 创建词典评分器
    ///
    /// # 参数
    /// - `neutral_threshold`: 极性绝对值不超过该值的句子判为中性
    pub fn new(neutral_threshold: f64) -> Result<Self, ScoringUnavailableError> {
        let sentence_re = Regex::new(SENTENCE_PATTERN)
            .map_err(|e| ScoringUnavailableError::construction_failed(BACKEND_NAME, e))?;
        let word_re = Regex::new(WORD_PATTERN)
            .map_err(|e| ScoringUnavailableError::construction_failed(BACKEND_NAME, e))?;

        Ok(Self {
            sentence_re,
            word_re,
            neutral_threshold,
        })
    }

    /// 同步评分
    pub fn score_sentences(&self, text: &str) -> Vec<SentenceScore> {
        self.split_sentences(text)
            .into_iter()
            .map(|sentence| {
                let polarity = self.polarity(sentence);
                let class = self.classify(polarity);
                debug!("句子极性 {:+.2} → {}: {}", polarity, class.label(), sentence);
                SentenceScore::new(sentence, class)
            })
            .collect()
    }

    /// 分句，去掉首尾空白，跳过空句
    pub fn split_sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.sentence_re
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// 计算句子极性
    fn polarity(&self, sentence: &str) -> f64 {
        let mut total = 0.0;
        let mut negate_next = false;
        let mut intensifier = 1.0;

        for word in self.word_re.find_iter(sentence) {
            let word = word.as_str().to_lowercase().replace('’', "'");

            if NEGATIONS.contains(word.as_str()) {
                negate_next = true;
                continue;
            }

            if let Some(multiplier) = INTENSIFIERS.get(word.as_str()) {
                intensifier = *multiplier;
                continue;
            }

            if let Some(score) = WORD_SCORES.get(word.as_str()) {
                let mut score = *score * intensifier;
                if negate_next {
                    score = -score;
                    negate_next = false;
                }
                intensifier = 1.0;
                total += score;
            }
        }

        total
    }

    fn classify(&self, polarity: f64) -> ScoreClass {
        if polarity > self.neutral_threshold {
            ScoreClass::Positive
        } else if polarity < -self.neutral_threshold {
            ScoreClass::Negative
        } else {
            ScoreClass::Neutral
        }
    }
}

impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn score<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ScoreResult> {
        async move { Ok(self.score_sentences(text)) }.boxed()
    }
}
