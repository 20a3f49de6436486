//! Classifier adapter
//!
//! Turns a free-text inquiry into `{intent, sentiment, urgency}`. Whatever
//! the provider does (times out, errors, wraps JSON in code fences, invents
//! labels), callers always get a usable `Classification`.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{Sentiment, Urgency};

/// Intent used when the classifier gives none
pub const DEFAULT_INTENT: &str = "General";

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Classifier output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            intent: DEFAULT_INTENT.to_string(),
            sentiment: Sentiment::default(),
            urgency: Urgency::default(),
        }
    }
}

/// Black-box text classifier. Infallible by contract.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, message: &str) -> Classification;
}

/// LLM connection settings
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
}

impl AiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(256),
            temperature: Some(0.0),
            timeout_seconds: 30,
        }
    }
}

/// Provider-side failures. Never leaves this module's callers.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing API key")]
    AuthenticationError,

    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

pub type AiResult<T> = Result<T, AiError>;

/// Fixed instruction prompt for a single message
pub fn build_prompt(message: &str) -> String {
    [
        "Analyze the customer inquiry message and respond with JSON only.",
        "Do not include code fences or prose.",
        "Fields: intent (string), sentiment (POSITIVE, NEUTRAL, NEGATIVE), urgency (LOW, MEDIUM, HIGH).",
        &format!("Message: \"{}\"", message),
    ]
    .join("\n")
}

/// Strip markdown code fences the model may wrap around its JSON
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // drop the info string (`json`, `JSON`, ...) up to the first newline
        text = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse raw model output into a classification, falling back per field
pub fn parse_classification(raw: &str) -> Classification {
    match serde_json::from_str::<Value>(strip_code_fences(raw)) {
        Ok(value) => normalize(&value),
        Err(e) => {
            tracing::warn!("Classifier returned unparseable JSON: {}", e);
            Classification::default()
        }
    }
}

/// Normalize a parsed JSON value. Non-objects yield the default.
pub fn normalize(value: &Value) -> Classification {
    let Some(obj) = value.as_object() else {
        return Classification::default();
    };

    let intent = obj
        .get("intent")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_INTENT)
        .to_string();

    let sentiment = obj
        .get("sentiment")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();

    let urgency = obj
        .get("urgency")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();

    Classification {
        intent,
        sentiment,
        urgency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_fenced_response() {
        let raw = "```json\n{\"intent\":\"Refund\",\"sentiment\":\"negative\",\"urgency\":\"high\"}\n```";
        let c = parse_classification(raw);
        assert_eq!(c.intent, "Refund");
        assert_eq!(c.sentiment, Sentiment::Negative);
        assert_eq!(c.urgency, Urgency::High);
    }

    #[test]
    fn test_unparseable_yields_exact_default() {
        let c = parse_classification("I think this customer is upset");
        assert_eq!(
            c,
            Classification {
                intent: "General".to_string(),
                sentiment: Sentiment::Neutral,
                urgency: Urgency::Medium,
            }
        );
    }

    #[test]
    fn test_non_object_yields_default() {
        assert_eq!(normalize(&json!(["a", "b"])), Classification::default());
        assert_eq!(normalize(&json!("HIGH")), Classification::default());
        assert_eq!(normalize(&Value::Null), Classification::default());
    }

    #[test]
    fn test_per_field_fallback() {
        let c = normalize(&json!({
            "intent": "",
            "sentiment": "furious",
            "urgency": "low"
        }));
        assert_eq!(c.intent, DEFAULT_INTENT);
        assert_eq!(c.sentiment, Sentiment::Neutral);
        assert_eq!(c.urgency, Urgency::Low);

        let c = normalize(&json!({ "intent": "Billing", "urgency": 3 }));
        assert_eq!(c.intent, "Billing");
        assert_eq!(c.urgency, Urgency::Medium);
    }

    #[test]
    fn test_prompt_embeds_message() {
        let prompt = build_prompt("Where is my parcel?");
        assert!(prompt.contains("JSON only"));
        assert!(prompt.contains("Message: \"Where is my parcel?\""));
    }
}
