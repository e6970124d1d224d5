use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use review_sentiment::codec::decode_scored;
use review_sentiment::models::DEFAULT_FIELD_DELIMITER;
use review_sentiment::services::ScoreResult;
use review_sentiment::{
    AppError, BatchOrchestrator, CodecOptions, Config, DecodeFormat, Delimiters, EncodeFormat,
    LexiconScorer, MalformedBatchError, OrchestratorOptions, Payload, RawInput, ReviewRecord,
    ReviewResult, ScoreClass, ScoringUnavailableError, SentenceScore, SentimentScorer,
};

/// 按句号分句的测试评分器
///
/// - 含 "Good" 的句子为正面，含 "bad" 的为负面，其余中性
/// - 文本为 "boom" 时评分失败
/// - 先被调用的评论睡得更久，让完成顺序和输入顺序相反
struct ScriptedScorer {
    calls: AtomicUsize,
}

impl ScriptedScorer {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl SentimentScorer for ScriptedScorer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn score<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ScoreResult> {
        let call_no = self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            let delay = 80u64.saturating_sub(call_no as u64 * 20);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            if text == "boom" {
                return Err(ScoringUnavailableError::invocation_failed(
                    "scripted",
                    "backend offline",
                ));
            }

            Ok(text
                .split_inclusive('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|sentence| {
                    let class = if sentence.contains("Good") {
                        ScoreClass::Positive
                    } else if sentence.contains("bad") {
                        ScoreClass::Negative
                    } else {
                        ScoreClass::Neutral
                    };
                    SentenceScore::new(sentence, class)
                })
                .collect())
        }
        .boxed()
    }
}

fn pipe_options(include_average: bool, max_concurrent_reviews: usize) -> OrchestratorOptions {
    OrchestratorOptions {
        codec: CodecOptions::new(Delimiters::new("|", "#").unwrap(), include_average),
        max_concurrent_reviews,
        review_timeout: None,
    }
}

fn orchestrator(options: OrchestratorOptions) -> BatchOrchestrator {
    BatchOrchestrator::with_options(Arc::new(ScriptedScorer::new()), options).unwrap()
}

#[tokio::test]
async fn test_output_order_matches_input_under_concurrency() {
    let orchestrator = orchestrator(pipe_options(false, 4));
    let batch = vec![
        ReviewRecord::new("a", "Good."),
        ReviewRecord::new("b", "Meh."),
        ReviewRecord::new("c", "So bad."),
        ReviewRecord::new("d", "Good. Okay."),
    ];

    let results = assert_ok!(orchestrator.score_batch(batch).await);
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
    assert_eq!(results[3].sentence_count(), 2);
}

#[tokio::test]
async fn test_duplicate_ids_are_kept_as_separate_reviews() {
    let orchestrator = orchestrator(pipe_options(false, 2));
    let payload = assert_ok!(
        orchestrator
            .run(
                &RawInput::from("7|Good.|7|So bad.|"),
                DecodeFormat::DelimitedString,
                EncodeFormat::DelimitedString,
            )
            .await
    );

    assert_eq!(
        payload,
        Payload::Delimited("7|Good.|3|#7|So bad.|1|#".to_string())
    );
}

#[tokio::test]
async fn test_empty_text_yields_no_score() {
    let orchestrator = orchestrator(pipe_options(true, 1));
    let payload = assert_ok!(
        orchestrator
            .run(
                &RawInput::from("3|"),
                DecodeFormat::DelimitedString,
                EncodeFormat::ScalarAverage,
            )
            .await
    );

    assert_eq!(payload, Payload::Scalar(None));
    assert_eq!(payload.to_wire_string().unwrap(), "NaN");
}

#[tokio::test]
async fn test_average_of_mixed_sentences() {
    let orchestrator = orchestrator(pipe_options(true, 1));
    let payload = assert_ok!(
        orchestrator
            .run(
                &RawInput::from("1|Good. So bad. Fine.|"),
                DecodeFormat::DelimitedString,
                EncodeFormat::ScalarAverage,
            )
            .await
    );

    assert_eq!(payload, Payload::Scalar(Some(2.0)));
}

#[tokio::test]
async fn test_dangling_id_is_malformed() {
    let orchestrator = orchestrator(pipe_options(false, 1));
    let err = assert_err!(
        orchestrator
            .run(
                &RawInput::from("1|Good.|2#"),
                DecodeFormat::DelimitedString,
                EncodeFormat::DelimitedString,
            )
            .await
    );

    assert!(matches!(
        err,
        AppError::Malformed(MalformedBatchError::OddFieldCount { .. })
    ));
}

#[tokio::test]
async fn test_scorer_failure_fails_whole_batch() {
    let orchestrator = orchestrator(pipe_options(false, 3));
    let err = assert_err!(
        orchestrator
            .run(
                &RawInput::from("1|Good.|2|boom|3|Fine.|"),
                DecodeFormat::DelimitedString,
                EncodeFormat::DelimitedString,
            )
            .await
    );

    assert!(matches!(err, AppError::ScoringUnavailable(_)));
}

#[tokio::test]
async fn test_review_timeout_is_scoring_unavailable() {
    let mut options = pipe_options(false, 1);
    options.review_timeout = Some(Duration::from_millis(5));
    let orchestrator = orchestrator(options);

    let err = assert_err!(
        orchestrator
            .run(
                &RawInput::from("1|Good.|"),
                DecodeFormat::DelimitedString,
                EncodeFormat::DelimitedString,
            )
            .await
    );

    assert!(matches!(
        err,
        AppError::ScoringUnavailable(ScoringUnavailableError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_run_output_decodes_back_to_scored_reviews() {
    let options = OrchestratorOptions {
        codec: CodecOptions::new(Delimiters::default(), true),
        max_concurrent_reviews: 2,
        review_timeout: None,
    };
    let codec_options = options.codec.clone();
    let orchestrator = orchestrator(options);

    // 使用默认分隔符，末尾带终止分隔符
    let fd = DEFAULT_FIELD_DELIMITER;
    let input = format!("1{fd}Good.{fd}2{fd}Bad. Very bad.{fd}");
    let payload = assert_ok!(
        orchestrator
            .run(
                &RawInput::from(input),
                DecodeFormat::DelimitedString,
                EncodeFormat::DelimitedString,
            )
            .await
    );

    let text = payload.to_wire_string().unwrap();
    let decoded = assert_ok!(decode_scored(&text, &codec_options));

    assert_eq!(
        decoded,
        vec![
            ReviewResult::new("1", vec![SentenceScore::new("Good.", ScoreClass::Positive)]),
            ReviewResult::new(
                "2",
                vec![
                    SentenceScore::new("Bad.", ScoreClass::Neutral),
                    SentenceScore::new("Very bad.", ScoreClass::Negative),
                ],
            ),
        ]
    );
    assert_eq!(decoded[1].average_score, Some(1.5));
}

#[tokio::test]
async fn test_review_grouped_to_nested_array() {
    let orchestrator = orchestrator(pipe_options(true, 2));
    let payload = assert_ok!(
        orchestrator
            .run(
                &RawInput::from("1|Good.#2|So bad. Fine.#3|#"),
                DecodeFormat::ReviewGrouped,
                EncodeFormat::NestedArray,
            )
            .await
    );

    let expected = json!([
        ["1", "Good.", 3, 3.0],
        ["2", "So bad.", 1, "Fine.", 2, 1.5],
        ["3", null]
    ]);
    let rendered: serde_json::Value =
        serde_json::from_str(&payload.to_wire_string().unwrap()).unwrap();
    assert_eq!(rendered, expected);
}

#[tokio::test]
async fn test_flat_array_input() {
    let orchestrator = orchestrator(pipe_options(false, 2));
    let raw = RawInput::from(vec![
        "10".to_string(),
        "Good.".to_string(),
        "11".to_string(),
        "Fine.".to_string(),
    ]);

    let payload = assert_ok!(
        orchestrator
            .run(&raw, DecodeFormat::FlatArray, EncodeFormat::DelimitedString)
            .await
    );
    assert_eq!(
        payload,
        Payload::Delimited("10|Good.|3|#11|Fine.|2|#".to_string())
    );
}

#[tokio::test]
async fn test_lexicon_scorer_end_to_end() {
    let config = Config::default();
    let scorer = Arc::new(LexiconScorer::new(config.neutral_threshold).unwrap());
    let orchestrator = BatchOrchestrator::new(scorer, &config).unwrap();

    let results = assert_ok!(
        orchestrator
            .score_batch(vec![
                ReviewRecord::new("1", "I love this app. It is terrible on tablets."),
                ReviewRecord::new("2", ""),
            ])
            .await
    );

    let classes: Vec<ScoreClass> = results[0]
        .sentences
        .iter()
        .map(|s| s.score_class)
        .collect();
    assert_eq!(classes, vec![ScoreClass::Positive, ScoreClass::Negative]);
    assert_eq!(results[0].average_score, Some(2.0));
    assert_eq!(results[1].average_score, None);
}
