//! LLM 评分器 - 业务能力层
//!
//! 只负责"让大模型分句并评分"这一能力，不关心批次和格式
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ScoringUnavailableError;
use crate::models::SentenceScore;
use crate::services::sentiment_scorer::{ScoreResult, SentimentScorer};
use crate::utils::logging::truncate_text;

const BACKEND_NAME: &str = "llm";

const SYSTEM_MESSAGE: &str = "You are a sentiment classifier for app store reviews. \
Split the review into sentences exactly as written, keeping their original order and wording. \
Classify every sentence as 1 (negative), 2 (neutral) or 3 (positive). \
Reply with a JSON array only, for example: \
[{\"sentence\": \"Great app.\", \"score\": 3}, {\"sentence\": \"It crashes a lot.\", \"score\": 1}]";

/// LLM 评分器
///
/// `async-openai` 的 Client 内部是线程安全的，可以被多个任务共享。
pub struct LlmScorer {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmScorer {
    /// 创建新的 LLM 评分器
    pub fn new(config: &Config) -> Result<Self, ScoringUnavailableError> {
        if config.llm_api_key.trim().is_empty() {
            return Err(ScoringUnavailableError::construction_failed(
                BACKEND_NAME,
                "缺少 LLM_API_KEY",
            ));
        }
        if config.llm_model_name.trim().is_empty() {
            return Err(ScoringUnavailableError::construction_failed(
                BACKEND_NAME,
                "缺少 LLM_MODEL_NAME",
            ));
        }

        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        })
    }

    /// 调用 LLM 对一段评论评分
    async fn score_text(&self, text: &str) -> ScoreResult {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "调用 LLM 评分，模型: {}，文本: {}",
            self.model_name,
            truncate_text(text, 60)
        );

        let response = self.send_to_llm(text).await?;
        let sentences = parse_score_response(&response)?;

        debug!("LLM 返回 {} 个句子", sentences.len());
        Ok(sentences)
    }

    /// 发送评分请求，返回 LLM 的原始回复
    async fn send_to_llm(&self, text: &str) -> Result<String, ScoringUnavailableError> {
        let invocation_failed = |e| ScoringUnavailableError::invocation_failed(BACKEND_NAME, e);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_MESSAGE)
            .build()
            .map_err(invocation_failed)?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .map_err(invocation_failed)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.0)
            .max_tokens(2048u32)
            .build()
            .map_err(invocation_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            invocation_failed(e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                ScoringUnavailableError::invalid_response(BACKEND_NAME, "LLM 返回内容为空")
            })?;

        Ok(content.trim().to_string())
    }
}

impl SentimentScorer for LlmScorer {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn score<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ScoreResult> {
        self.score_text(text).boxed()
    }
}

/// 解析 LLM 回复
///
/// 允许外层包着 ```json 代码块；评分必须是 1/2/3，句子不能为空。
fn parse_score_response(response: &str) -> ScoreResult {
    let body = strip_code_fence(response);

    let sentences: Vec<SentenceScore> = serde_json::from_str(body).map_err(|e| {
        warn!("无法解析 LLM 回复: '{}'", truncate_text(response, 80));
        ScoringUnavailableError::invalid_response(BACKEND_NAME, e.to_string())
    })?;

    if let Some(blank) = sentences.iter().position(|s| s.sentence_text.trim().is_empty()) {
        return Err(ScoringUnavailableError::invalid_response(
            BACKEND_NAME,
            format!("第 {} 个句子为空", blank + 1),
        ));
    }

    Ok(sentences)
}

fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 去掉语言标记（如 json）所在的第一行
    let inner = match inner.find('\n') {
        Some(newline) => &inner[newline + 1..],
        None => inner,
    };
    inner.trim_end().trim_end_matches("```").trim()
}
