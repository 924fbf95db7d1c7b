//! Direct HTTP API tier.
//!
//! The last line of defense: when no CLI tool can serve a request, go
//! straight to the vendor's hosted API with a credential from the
//! environment. Unlike the CLI tiers this path bypasses any subscription
//! the local tooling may carry, so the first use logs a billing warning.

use super::TierClient;
use super::descriptor::{ApiFamily, descriptor_for};
use crate::decode::usage_from_value;
use crate::process::scan::truncate_detail;
use crate::retry::{RetryOptions, with_retry_timeout};
use async_trait::async_trait;
use gengate_domain::{GenerationRequest, GenerationResponse, InvokeError};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Once;
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const OPENAI_API_BASE: &str = "https://api.openai.com";

static BILLING_WARNING: Once = Once::new();

/// The direct-API execution tier, serving both provider families.
pub struct ApiTier {
    client: reqwest::Client,
    /// Environment snapshot the credentials are read from.
    env: HashMap<String, String>,
    gemini_base: String,
    openai_base: String,
    retry: RetryOptions,
}

impl ApiTier {
    pub fn new(env: HashMap<String, String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            env,
            gemini_base: GEMINI_API_BASE.to_string(),
            openai_base: OPENAI_API_BASE.to_string(),
            retry: RetryOptions::quick(),
        }
    }

    pub fn with_retry_options(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    /// Override the endpoint bases (local test servers, proxies).
    pub fn with_base_urls(
        mut self,
        gemini_base: impl Into<String>,
        openai_base: impl Into<String>,
    ) -> Self {
        self.gemini_base = gemini_base.into();
        self.openai_base = openai_base.into();
        self
    }

    fn api_key(&self, var: &str) -> Result<&str, InvokeError> {
        self.env
            .get(var)
            .map(String::as_str)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| InvokeError::Api {
                status: None,
                message: format!("no credential in {var} for direct API access"),
            })
    }

    async fn call_gemini(
        &self,
        key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<GenerationResponse, InvokeError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.gemini_base, model
        );
        let body = GeminiRequest::from_prompt(prompt);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;
        if !(200..300).contains(&status) {
            return Err(status_error(status, &text));
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| InvokeError::Decode {
            reason: format!("malformed API response: {e}"),
        })?;
        decode_gemini_response(&value)
    }

    async fn call_openai(
        &self,
        key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<GenerationResponse, InvokeError> {
        let url = format!("{}/v1/chat/completions", self.openai_base);
        let body = OpenAiRequest::from_prompt(model, prompt);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;
        if !(200..300).contains(&status) {
            return Err(status_error(status, &text));
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| InvokeError::Decode {
            reason: format!("malformed API response: {e}"),
        })?;
        decode_openai_response(&value)
    }
}

#[async_trait]
impl TierClient for ApiTier {
    fn label(&self) -> String {
        "api".to_string()
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, InvokeError> {
        BILLING_WARNING.call_once(|| {
            warn!("falling through to direct API calls; usage is billed per token");
        });

        let descriptor = descriptor_for(&request.model);
        let key = self.api_key(descriptor.api_key_env)?;
        let model = request.model.as_str().to_string();
        debug!(provider = descriptor.name, model = %model, "direct API call");

        with_retry_timeout(&self.retry, request.timeout, |_| {
            let model = model.clone();
            async move {
                match descriptor.api {
                    ApiFamily::Gemini => self.call_gemini(key, &model, &request.prompt).await,
                    ApiFamily::OpenAi => self.call_openai(key, &model, &request.prompt).await,
                }
            }
        })
        .await
        .into_result()
    }
}

/// A transport-level failure (DNS, TLS, refused connection).
///
/// reqwest error displays never include request headers, so credentials
/// cannot leak through this path.
fn transport_error(error: reqwest::Error) -> InvokeError {
    InvokeError::Api {
        status: error.status().map(|s| s.as_u16()),
        message: error.to_string(),
    }
}

fn status_error(status: u16, body: &str) -> InvokeError {
    // Vendors wrap the useful message in an `error` object; fall back to
    // a body snippet when they don't.
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| truncate_detail(body));
    InvokeError::Api {
        status: Some(status),
        message,
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

impl GeminiRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

impl OpenAiRequest {
    fn from_prompt(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![OpenAiMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        }
    }
}

/// Extract text and usage from a `generateContent` response.
fn decode_gemini_response(value: &Value) -> Result<GenerationResponse, InvokeError> {
    let parts = value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array);

    let text = parts
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(InvokeError::Decode {
            reason: "empty response".into(),
        });
    }

    let mut response = GenerationResponse::new(text);
    response.usage = value.get("usageMetadata").and_then(usage_from_value);
    Ok(response)
}

/// Extract text and usage from a `chat/completions` response.
fn decode_openai_response(value: &Value) -> Result<GenerationResponse, InvokeError> {
    let text = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if text.is_empty() {
        return Err(InvokeError::Decode {
            reason: "empty response".into(),
        });
    }

    let mut response = GenerationResponse::new(text);
    response.usage = value.get("usage").and_then(usage_from_value);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gengate_domain::Model;
    use serde_json::json;

    #[test]
    fn missing_key_is_api_error() {
        let tier = ApiTier::new(HashMap::new());
        let err = tier.api_key("GEMINI_API_KEY").unwrap_err();
        match err {
            InvokeError::Api { status, message } => {
                assert!(status.is_none());
                assert!(message.contains("GEMINI_API_KEY"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let env = HashMap::from([("OPENAI_API_KEY".to_string(), "  ".to_string())]);
        let tier = ApiTier::new(env);
        assert!(tier.api_key("OPENAI_API_KEY").is_err());
    }

    #[test]
    fn gemini_request_shape() {
        let body = serde_json::to_value(GeminiRequest::from_prompt("hi")).unwrap();
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "hi"}]}]}));
    }

    #[test]
    fn openai_request_shape() {
        let body = serde_json::to_value(OpenAiRequest::from_prompt("gpt-5", "hi")).unwrap();
        assert_eq!(
            body,
            json!({"model": "gpt-5", "messages": [{"role": "user", "content": "hi"}]})
        );
    }

    #[test]
    fn gemini_response_text_and_usage() {
        let value = json!({
            "candidates": [{"content": {"parts": [{"text": "A red "}, {"text": "bicycle"}]}}],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 4, "totalTokenCount": 11}
        });
        let response = decode_gemini_response(&value).unwrap();
        assert_eq!(response.text, "A red bicycle");
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 7);
        assert_eq!(usage.completion_tokens, 4);
        assert_eq!(usage.total_tokens, 11);
    }

    #[test]
    fn openai_response_text_and_usage() {
        let value = json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });
        let response = decode_openai_response(&value).unwrap();
        assert_eq!(response.text, "Hello");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn empty_candidates_is_decode_failure() {
        let value = json!({"candidates": []});
        assert!(matches!(
            decode_gemini_response(&value).unwrap_err(),
            InvokeError::Decode { .. }
        ));
    }

    #[test]
    fn status_error_prefers_vendor_message() {
        let err = status_error(429, r#"{"error": {"message": "quota exceeded"}}"#);
        match err {
            InvokeError::Api { status, message } => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn status_error_falls_back_to_body_snippet() {
        let err = status_error(502, "<html>bad gateway</html>");
        match err {
            InvokeError::Api { status, message } => {
                assert_eq!(status, Some(502));
                assert!(message.contains("bad gateway"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn api_tier_label() {
        assert_eq!(ApiTier::new(HashMap::new()).label(), "api");
    }

    #[test]
    fn model_names_skip_cli_aliases() {
        // The hosted API takes the logical name, not the CLI spelling.
        assert_eq!(Model::Gpt5Mini.as_str(), "gpt-5-mini");
    }
}
