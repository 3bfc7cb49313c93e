//! Gemini `generateContent` client with model fallback.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{ApiClient, RetryPolicy};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Map an error object embedded in a 200 response.
fn classify_api_error(err: &ApiError) -> ClientError {
    let message = err.message.clone().unwrap_or_else(|| "Unknown error".to_string());
    match err.code {
        Some(429) => ClientError::QuotaExhausted(message),
        Some(403) if message.to_lowercase().contains("quota") => ClientError::QuotaExhausted(message),
        Some(code @ 500..=599) => ClientError::server(code, message),
        Some(code) => ClientError::UnexpectedStatus { status: code, message },
        None => ClientError::UnexpectedStatus { status: 0, message },
    }
}

/// Generated text and the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Trimmed response text.
    pub text: String,
    /// Model id that answered.
    pub model: String,
}

/// Gemini client.
///
/// Rate-limit and quota failures on the primary model are retried with
/// the configured backoff; if the primary is still limited the fallback
/// model gets one attempt.
#[derive(Clone)]
pub struct GeminiClient {
    client: ApiClient,
    base_url: String,
    model: String,
    fallback_model: Option<String>,
    retry: RetryPolicy,
    pacing: Duration,
}

impl GeminiClient {
    /// Build a client for the summarization models, or `None` without a key.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn from_config(config: &Config) -> ClientResult<Option<Self>> {
        let Some(key) = config.gemini_api_key.as_ref() else {
            return Ok(None);
        };

        Ok(Some(Self {
            client: ApiClient::new(
                &[("x-goog-api-key", key.clone())],
                config.llm_request_timeout,
                config.connect_timeout,
            )?,
            base_url: config.gemini_api_url.clone(),
            model: config.gemini_model.clone(),
            fallback_model: Some(config.gemini_fallback_model.clone()).filter(|m| *m != config.gemini_model),
            retry: config.llm_retry,
            pacing: config.llm_pacing,
        }))
    }

    /// Same client with a different primary model and optional fallback.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, fallback_model: Option<String>) -> Self {
        self.model = model.into();
        self.fallback_model = fallback_model;
        self
    }

    /// Primary model id.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text for a single prompt.
    ///
    /// # Errors
    ///
    /// Returns the primary model's error when it is not a rate limit, or
    /// the fallback model's error when that attempt also fails.
    pub async fn generate(&self, prompt: &str) -> ClientResult<Generation> {
        let primary = self
            .retry
            .run_if("gemini", ClientError::is_rate_limit, || self.generate_with(&self.model, prompt))
            .await;

        let generation = match (primary, &self.fallback_model) {
            (Ok(generation), _) => generation,
            (Err(err), Some(fallback)) if err.is_rate_limit() => {
                warn!(model = %self.model, fallback = %fallback, error = %err, "Primary model limited, switching to fallback");
                let generation = self.generate_with(fallback, prompt).await?;
                info!(model = %fallback, "Fallback model answered");
                generation
            }
            (Err(err), _) => return Err(err),
        };

        tokio::time::sleep(self.pacing).await;
        Ok(generation)
    }

    async fn generate_with(&self, model: &str, prompt: &str) -> ClientResult<Generation> {
        let url = format!("{}/{}:generateContent", self.base_url, model);
        let request = GenerateContentRequest { contents: vec![Content { parts: vec![Part { text: prompt }] }] };

        let response: GenerateContentResponse = self.client.post_json(&url, &request).await?;
        if let Some(err) = &response.error {
            return Err(classify_api_error(err));
        }

        let text = response.text();
        debug!(model, chars = text.len(), "Gemini generation complete");
        Ok(Generation { text, model: model.to_string() })
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .finish()
    }
}
