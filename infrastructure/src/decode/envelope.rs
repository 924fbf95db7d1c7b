//! Single-envelope decoder.
//!
//! Parses the captured stdout as one JSON record and probes an ordered
//! list of candidate fields for the response text, tolerating prose and
//! markdown fencing around the payload. Used by the Gemini CLI
//! (`--output-format json`) and the OpenCode bridge.

use super::{strip_code_fence, usage_from_stats};
use crate::process::scan::classify_failure_text;
use gengate_domain::{GenerationResponse, InvokeError, ToolId};
use serde_json::Value;
use tracing::debug;

/// Candidate field names for the response text, in probe order.
const TEXT_FIELDS: &[&str] = &["response", "text", "content", "output", "result"];

/// Candidate field names for the usage/statistics container.
const STATS_FIELDS: &[&str] = &["stats", "usage", "usageMetadata"];

/// Decode one structured envelope from captured stdout.
///
/// Tolerates prose and markdown fencing around the payload: after the
/// whole output fails to parse, [`embedded_payload`] digs for a buried
/// envelope before the raw-text fallback. Output with no JSON anywhere is
/// returned verbatim. A parsed envelope carrying an `error` field is
/// classified like a process failure; a parsed envelope with no
/// recognized text field is a decode failure rather than silently
/// returning the serialized envelope.
pub fn decode_envelope(
    tool: ToolId,
    model: &str,
    raw: &str,
    extra_auth_markers: &[&str],
) -> Result<GenerationResponse, InvokeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvokeError::Decode {
            reason: "empty response".into(),
        });
    }

    let candidate = strip_code_fence(trimmed);

    if let Ok(envelope) = serde_json::from_str::<Value>(&candidate) {
        return decode_value(tool, model, &envelope, extra_auth_markers);
    }

    // Tools often print login banners or progress lines before the
    // envelope; look for a payload buried in the prose.
    if let Some(inner) = embedded_payload(trimmed)
        && let Ok(envelope) = serde_json::from_str::<Value>(&inner)
    {
        return decode_value(tool, model, &envelope, extra_auth_markers);
    }

    // Raw text fallback: the tool answered in plain prose.
    Ok(GenerationResponse::new(candidate))
}

/// Locate a JSON payload surrounded by prose.
///
/// Two shapes are recognized: a fenced block after leading text, and a
/// trailing line that looks like a complete JSON object. Returns the
/// candidate only; the caller decides whether it actually parses.
fn embedded_payload(text: &str) -> Option<String> {
    if let Some(idx) = text.find("```")
        && idx > 0
    {
        return Some(strip_code_fence(&text[idx..]));
    }

    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with('{') && line.ends_with('}'))
        .map(str::to_string)
}

/// Interpret one parsed envelope.
fn decode_value(
    tool: ToolId,
    model: &str,
    envelope: &Value,
    extra_auth_markers: &[&str],
) -> Result<GenerationResponse, InvokeError> {
    if let Some(message) = envelope.get("error").and_then(Value::as_str)
        && !message.is_empty()
    {
        return Err(classify_failure_text(
            tool,
            model,
            None,
            message,
            extra_auth_markers,
        ));
    }

    if let Some(session) = envelope
        .get("session_id")
        .or_else(|| envelope.get("sessionId"))
        .and_then(Value::as_str)
    {
        debug!(tool = %tool, session_id = %session, "envelope session");
    }

    let text = TEXT_FIELDS
        .iter()
        .find_map(|f| envelope.get(*f)?.as_str())
        .map(strip_code_fence);

    let Some(text) = text else {
        return Err(InvokeError::Decode {
            reason: "no recognized response field in envelope".into(),
        });
    };
    if text.is_empty() {
        return Err(InvokeError::Decode {
            reason: "empty response".into(),
        });
    }

    let usage = STATS_FIELDS
        .iter()
        .find_map(|f| usage_from_stats(envelope.get(*f)?));

    let mut response = GenerationResponse::new(text);
    response.usage = usage;
    Ok(response)
}
