// Google Gemini advisory client
//
// One `generateContent` call per classification, wrapped in the bounded
// backoff from `retry`. The prompt is sent as a single text part and the
// reply is read from the first part of the first candidate.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::prompt::build_prompt;
use super::retry::{with_retry, RetryError, RetryPolicy, Sleeper, TokioSleeper};
use super::AdvisoryClassifier;
use crate::errors::AdvisoryError;
use crate::interview::ClassificationRequest;

pub const REQUEST_TIMEOUT_SECS: u64 = 60;
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// Advisory classifier backed by the Gemini API.
#[derive(Clone)]
pub struct GeminiClassifier {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl GeminiClassifier {
    /// Create a classifier with the default model, endpoint and backoff.
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(REQUEST_TIMEOUT_SECS))?,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a different endpoint root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send a single generation request (no retry)
    async fn generate_once(&self, prompt: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = GeminiRequest::from_prompt(prompt);

        tracing::debug!(model = %self.model, "Sending classification request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send request to Gemini API: {}", e.without_url()))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Gemini API request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        let text = gemini_response.first_text();
        tracing::debug!("Received classification reply: {:?}", text);

        Ok(text)
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

#[async_trait]
impl AdvisoryClassifier for GeminiClassifier {
    async fn classify(
        &self,
        request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, AdvisoryError> {
        let prompt = build_prompt(request);

        with_retry(&self.policy, self.sleeper.as_ref(), cancel, || {
            self.generate_once(&prompt)
        })
        .await
        .map_err(|e| match e {
            RetryError::Cancelled => AdvisoryError::Cancelled,
            RetryError::Exhausted {
                attempts,
                last_error,
            } => AdvisoryError::Unavailable {
                attempts,
                last_error: format!("{:#}", last_error),
            },
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// Gemini API types

#[derive(Debug, Clone, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    /// `candidates[0].content.parts[0].text`, if present.
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}
