pub mod format;
pub mod review;

pub use format::{
    DecodeFormat, Delimiters, EncodeFormat, Payload, RawInput, DEFAULT_FIELD_DELIMITER,
    DEFAULT_REVIEW_DELIMITER,
};
pub use review::{average_of, ReviewRecord, ReviewResult, ScoreClass, SentenceScore};
