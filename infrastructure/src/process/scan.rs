//! Failure-text classification.
//!
//! CLI tools rarely use distinct exit codes for distinct failures; the
//! useful signal is in their output text. This module turns captured
//! output into the matching typed error. Auth patterns are checked before
//! model patterns because several tools print "model requires login"
//! style messages that would otherwise misclassify.

use gengate_domain::{InvokeError, ToolId};

/// Case-insensitive substrings indicating an authentication failure.
const AUTH_MARKERS: &[&str] = &["not logged in", "unauthorized", "login", "auth"];

/// Case-insensitive substrings indicating the requested model is unknown
/// or unsupported by this tool.
const MODEL_MARKERS: &[&str] = &[
    "unknown model",
    "model not found",
    "unsupported model",
    "invalid model",
    "no such model",
];

/// Longest failure detail kept on an error (enough for diagnostics,
/// short enough to not drown logs).
const MAX_DETAIL_LEN: usize = 400;

/// Classify a tool failure from its combined stderr/stdout text.
///
/// `extra_auth_markers` lets a provider descriptor contribute
/// tool-specific phrases (e.g. "run codex login") on top of the common
/// set. Falls back to [`InvokeError::ToolFailed`] carrying the raw exit
/// code when nothing matches.
pub fn classify_failure_text(
    tool: ToolId,
    model: &str,
    exit_code: Option<i32>,
    text: &str,
    extra_auth_markers: &[&str],
) -> InvokeError {
    let lower = text.to_lowercase();

    let auth_hit = AUTH_MARKERS
        .iter()
        .chain(extra_auth_markers.iter())
        .any(|m| lower.contains(m));
    if auth_hit {
        return InvokeError::AuthFailed {
            tool,
            detail: truncate_detail(text),
        };
    }

    if MODEL_MARKERS.iter().any(|m| lower.contains(m)) {
        return InvokeError::ModelUnavailable {
            tool,
            model: model.to_string(),
        };
    }

    InvokeError::ToolFailed {
        tool,
        exit_code,
        detail: truncate_detail(text),
    }
}

/// Trim and bound a failure detail string.
pub fn truncate_detail(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= MAX_DETAIL_LEN {
        return trimmed.to_string();
    }
    let mut end = MAX_DETAIL_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
