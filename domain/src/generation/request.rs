//! The request/response contract exposed to the content pipeline.

use super::usage::TokenUsage;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wall-clock budget for one generation request (2 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// One logical generation request.
///
/// Immutable once built; the router may attempt it against several tiers
/// but never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The full prompt text sent to the model.
    pub prompt: String,
    /// Target model; determines the logical provider.
    pub model: Model,
    /// Wall-clock budget for a single tier attempt.
    #[serde(default = "default_timeout", with = "duration_ms")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Serialize the timeout as milliseconds, matching the wire shape the
/// content pipeline uses.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: Model) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The decoded result of a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text, markdown fences already stripped.
    pub text: String,
    /// Normalized usage counters, when the tier reported any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl GenerationResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}
