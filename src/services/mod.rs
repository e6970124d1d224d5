pub mod lexicon_scorer;
pub mod llm_scorer;
pub mod sentiment_scorer;

pub use lexicon_scorer::LexiconScorer;
pub use llm_scorer::LlmScorer;
pub use sentiment_scorer::{build_scorer, ScoreResult, SentimentScorer};
