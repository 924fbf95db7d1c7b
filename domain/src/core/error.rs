//! Typed error taxonomy for tool invocation
//!
//! Every failure mode of the three execution tiers maps to exactly one
//! variant here. The classification drives two policies:
//!
//! - the retry engine's default predicate (rate-limit / server / network
//!   failures are retried within a tier), and
//! - the fallback router's transition rule ([`is_tier_recoverable`]
//!   failures fall through to the next tier, everything else propagates).
//!
//! [`is_tier_recoverable`]: InvokeError::is_tier_recoverable

use super::tool::ToolId;
use thiserror::Error;

/// Errors produced while invoking an LLM tool or endpoint.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// Tool executable absent from `$PATH` or the configured path.
    #[error("{tool} not found on this system")]
    NotFound { tool: ToolId },

    /// The tool reported an authentication/login failure.
    #[error("{tool} is not authenticated: {detail}")]
    AuthFailed { tool: ToolId, detail: String },

    /// Wall-clock budget exceeded before the operation completed.
    ///
    /// This only means the caller stopped waiting; the underlying
    /// process may still be running (termination is best-effort).
    #[error("timed out after {waited_ms}ms")]
    Timeout {
        tool: Option<ToolId>,
        waited_ms: u64,
    },

    /// The tool does not know or support the requested model.
    #[error("{tool} does not support model {model}")]
    ModelUnavailable { tool: ToolId, model: String },

    /// Any other non-zero exit, with the raw exit code preserved.
    #[error("{tool} exited with code {code:?}: {detail}", code = exit_code)]
    ToolFailed {
        tool: ToolId,
        exit_code: Option<i32>,
        detail: String,
    },

    /// Output could not be decoded into any recognized response shape.
    #[error("could not decode tool output: {reason}")]
    Decode { reason: String },

    /// A failure from the direct API tier (HTTP status or transport).
    #[error("API request failed{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// Every enabled tier was tried and failed.
    #[error("all generation tiers failed (attempted: {}): {last_error}", attempted.join(", "))]
    AllTiersFailed {
        attempted: Vec<String>,
        last_error: String,
    },
}

impl InvokeError {
    /// Whether the next execution tier is expected to plausibly succeed.
    ///
    /// Not-found, auth, timeout, generic tool failures and undecodable
    /// output are conditions local to one tier. Everything else (bad
    /// model, API refusals, composites) propagates immediately.
    pub fn is_tier_recoverable(&self) -> bool {
        matches!(
            self,
            InvokeError::NotFound { .. }
                | InvokeError::AuthFailed { .. }
                | InvokeError::Timeout { .. }
                | InvokeError::ToolFailed { .. }
                | InvokeError::Decode { .. }
        )
    }

    /// The raw process exit code, when this error came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            InvokeError::ToolFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// The tool that produced this error, where applicable.
    pub fn tool(&self) -> Option<ToolId> {
        match self {
            InvokeError::NotFound { tool }
            | InvokeError::AuthFailed { tool, .. }
            | InvokeError::ModelUnavailable { tool, .. }
            | InvokeError::ToolFailed { tool, .. } => Some(*tool),
            InvokeError::Timeout { tool, .. } => *tool,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        assert!(
            InvokeError::NotFound {
                tool: ToolId::GeminiCli
            }
            .is_tier_recoverable()
        );
        assert!(
            InvokeError::Timeout {
                tool: None,
                waited_ms: 1000
            }
            .is_tier_recoverable()
        );
        assert!(
            InvokeError::Decode {
                reason: "empty response".into()
            }
            .is_tier_recoverable()
        );
        assert!(
            !InvokeError::ModelUnavailable {
                tool: ToolId::CodexCli,
                model: "gpt-5".into()
            }
            .is_tier_recoverable()
        );
        assert!(
            !InvokeError::Api {
                status: Some(400),
                message: "bad request".into()
            }
            .is_tier_recoverable()
        );
    }

    #[test]
    fn exit_code_preserved() {
        let err = InvokeError::ToolFailed {
            tool: ToolId::GeminiCli,
            exit_code: Some(42),
            detail: "boom".into(),
        };
        assert_eq!(err.exit_code(), Some(42));
        assert_eq!(err.tool(), Some(ToolId::GeminiCli));
    }

    #[test]
    fn all_tiers_failed_names_attempts() {
        let err = InvokeError::AllTiersFailed {
            attempted: vec!["cli:gemini".into(), "api".into()],
            last_error: "timed out".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cli:gemini, api"));
        assert!(msg.contains("timed out"));
    }
}
