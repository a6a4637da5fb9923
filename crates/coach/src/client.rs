use std::time::Duration;

use promptcademy_core::scoring::{normalize_reply, ScoreRequest, ScoreResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::CoachConfig;
use crate::error::CoachError;
use crate::prompt::{scoring_messages, ChatMessage};

/// Token cap for playground completions.
pub const PLAYGROUND_MAX_TOKENS: u32 = 300;

const TEMPERATURE: f32 = 0.2;

/// Chat-completion client. Disabled (every call fails with
/// [`CoachError::NotConfigured`]) when built without a config.
#[derive(Clone)]
pub struct CoachClient {
    client: Client,
    config: Option<CoachConfig>,
}

impl CoachClient {
    pub fn from_env() -> Result<Self, CoachError> {
        Self::new(CoachConfig::from_env())
    }

    /// Build a client whose requests time out after the configured duration.
    pub fn new(config: Option<CoachConfig>) -> Result<Self, CoachError> {
        let mut builder = Client::builder();
        if let Some(cfg) = &config {
            builder = builder.timeout(cfg.timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    pub fn model(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.model.as_str())
    }

    /// Upstream request timeout, when enabled.
    pub fn timeout(&self) -> Option<Duration> {
        self.config.as_ref().map(|c| c.timeout)
    }

    /// Score a deliverable against its rubric.
    ///
    /// Validates the request first, then checks configuration, then makes
    /// exactly one upstream call. A reply that is not a usable JSON object
    /// degrades to [`ScoreResult::degraded`] instead of failing.
    pub async fn score(&self, request: &ScoreRequest) -> Result<ScoreResult, CoachError> {
        let (deliverable, rubric) = request.validate()?;
        let config = self.config.as_ref().ok_or(CoachError::NotConfigured)?;

        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(config.model.as_str());

        let payload = ChatRequest {
            model,
            messages: scoring_messages(deliverable, rubric, &request.context_or_empty()),
            temperature: TEMPERATURE,
            max_tokens: None,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(config.completions_url())
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let raw = response.text().await?;

        let content = match serde_json::from_str::<ChatResponse>(&raw) {
            Ok(body) => first_content(body),
            Err(e) => {
                tracing::warn!(error = %e, "Coach reply envelope was not valid JSON");
                None
            }
        };

        let Some(content) = content.filter(|c| !c.trim().is_empty()) else {
            tracing::warn!(model, "Coach reply had no content, using neutral score");
            return Ok(ScoreResult::degraded(rubric));
        };

        let result = normalize_reply(&content, rubric);
        tracing::debug!(model, total = result.total, "Coach scored deliverable");
        Ok(result)
    }

    /// Single-message completion capped at `max_tokens`. Missing content
    /// yields an empty string.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, CoachError> {
        let config = self.config.as_ref().ok_or(CoachError::NotConfigured)?;

        let payload = ChatRequest {
            model: &config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: TEMPERATURE,
            max_tokens: Some(max_tokens),
            response_format: None,
        };

        let response = self
            .client
            .post(config.completions_url())
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;
        let body: ChatResponse = ensure_success(response).await?.json().await?;

        Ok(first_content(body).unwrap_or_default().trim().to_string())
    }
}

// ---- private helpers ----

/// Pass a 2xx response through, or turn it into [`CoachError::Api`].
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CoachError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        tracing::warn!(status = status.as_u16(), "Coach upstream returned an error");
        return Err(CoachError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

fn first_content(body: ChatResponse) -> Option<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
