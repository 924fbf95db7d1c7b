//! Normalized token usage counters.
//!
//! Every tier reports usage under different vendor field names (when it
//! reports usage at all). The decoders translate whatever they find into
//! this one shape so the content pipeline can account for cost uniformly.

use serde::{Deserialize, Serialize};

/// Token usage for one generation, normalized across tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// Reasoning/thinking tokens, where the vendor reports them separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_tokens: Option<u64>,
    /// Prompt tokens served from the provider's cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_prompt_tokens: Option<u64>,
}

impl TokenUsage {
    /// Build counters from prompt/completion counts, deriving the total.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            thinking_tokens: None,
            cached_prompt_tokens: None,
        }
    }

    pub fn with_thinking(mut self, tokens: u64) -> Self {
        self.thinking_tokens = Some(tokens);
        self
    }

    pub fn with_cached_prompt(mut self, tokens: u64) -> Self {
        self.cached_prompt_tokens = Some(tokens);
        self
    }

    /// Fill in a missing total from the component counts.
    ///
    /// Some vendors omit the total; others report all three. A reported
    /// total wins over the derived one.
    pub fn reconcile(mut self) -> Self {
        if self.total_tokens == 0 {
            self.total_tokens = self.prompt_tokens + self.completion_tokens;
        }
        self
    }

    /// True when no counter carries information.
    pub fn is_empty(&self) -> bool {
        self.total_tokens == 0
            && self.prompt_tokens == 0
            && self.completion_tokens == 0
            && self.thinking_tokens.is_none()
            && self.cached_prompt_tokens.is_none()
    }

    /// Sum two usage reports (grouped-by-model stats are merged this way).
    pub fn merge(self, other: TokenUsage) -> Self {
        Self {
            prompt_tokens: self.prompt_tokens + other.prompt_tokens,
            completion_tokens: self.completion_tokens + other.completion_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
            thinking_tokens: merge_opt(self.thinking_tokens, other.thinking_tokens),
            cached_prompt_tokens: merge_opt(self.cached_prompt_tokens, other.cached_prompt_tokens),
        }
    }
}

fn merge_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0) + b.unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_total() {
        let usage = TokenUsage::new(10, 5);
        assert_eq!(usage.total_tokens, 15);
    }

    #[test]
    fn test_reconcile_keeps_reported_total() {
        let usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 17, // vendor counted thinking tokens in the total
            thinking_tokens: Some(2),
            cached_prompt_tokens: None,
        };
        assert_eq!(usage.reconcile().total_tokens, 17);
    }

    #[test]
    fn test_reconcile_fills_missing_total() {
        let usage = TokenUsage {
            prompt_tokens: 8,
            completion_tokens: 4,
            total_tokens: 0,
            thinking_tokens: None,
            cached_prompt_tokens: None,
        };
        assert_eq!(usage.reconcile().total_tokens, 12);
    }

    #[test]
    fn test_merge_grouped_stats() {
        let a = TokenUsage::new(10, 5).with_thinking(3);
        let b = TokenUsage::new(2, 1);
        let merged = a.merge(b);
        assert_eq!(merged.prompt_tokens, 12);
        assert_eq!(merged.completion_tokens, 6);
        assert_eq!(merged.total_tokens, 18);
        assert_eq!(merged.thinking_tokens, Some(3));
    }

    #[test]
    fn test_is_empty() {
        assert!(TokenUsage::default().is_empty());
        assert!(!TokenUsage::new(1, 0).is_empty());
    }
}
