//! Google Gemini API client
//!
//! Sends the classification prompt to `generateContent` and hands the text
//! back to the parser in `ai`. Transport and provider failures become the
//! default classification.

use super::{AiConfig, AiError, AiResult, Classification, Classifier};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: AiConfig,
    client: Client,
    base_url: String,
}

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    response_mime_type: &'static str,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: AiConfig) -> AiResult<Self> {
        Self::with_base_url(config, GEMINI_BASE_URL)
    }

    /// Create a client against a different endpoint (proxies, tests)
    pub fn with_base_url(config: AiConfig, base_url: impl Into<String>) -> AiResult<Self> {
        if config.api_key.is_empty() {
            return Err(AiError::AuthenticationError);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(AiError::HttpError)?;

        Ok(Self {
            config,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Send the prompt and return the first candidate's text
    async fn send_request(&self, prompt: &str) -> AiResult<String> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
                response_mime_type: "application/json",
            }),
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.config.model, self.config.api_key
        );

        debug!(
            "Sending request to Gemini API: {}",
            url.replace(&self.config.api_key, "***")
        );

        let response = self.client.post(&url).json(&request_body).send().await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Gemini API error: {} - {}", status, response_text);
            return Err(AiError::ApiError(format!(
                "HTTP {}: {}",
                status, response_text
            )));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&response_text)?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                "Gemini API usage - Prompt: {:?} tokens, Response: {:?} tokens",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AiError::InvalidResponse("No text in first candidate".to_string()))
    }

    /// Classify, surfacing provider errors. `Classifier::classify` wraps this.
    pub async fn try_classify(&self, message: &str) -> AiResult<Classification> {
        let prompt = super::build_prompt(message);
        let budget = Duration::from_secs(self.config.timeout_seconds);

        let raw = tokio::time::timeout(budget, self.send_request(&prompt))
            .await
            .map_err(|_| AiError::Timeout(self.config.timeout_seconds))??;

        Ok(super::parse_classification(&raw))
    }
}

#[async_trait]
impl Classifier for GeminiClient {
    async fn classify(&self, message: &str) -> Classification {
        match self.try_classify(message).await {
            Ok(classification) => {
                info!(
                    intent = %classification.intent,
                    sentiment = %classification.sentiment,
                    urgency = %classification.urgency,
                    "Inquiry classified"
                );
                classification
            }
            Err(e) => {
                warn!("Gemini classification failed, using default: {}", e);
                Classification::default()
            }
        }
    }
}
