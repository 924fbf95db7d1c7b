//! Record-stream decoder.
//!
//! Parses output as one self-describing JSON record per line, the shape
//! Codex CLI emits under `exec --json`:
//!
//! ```text
//! {"type":"thread.started","thread_id":"t1"}
//! {"type":"item.completed","item":{"text":"Hello"}}
//! {"type":"turn.completed","usage":{"input_tokens":10,"output_tokens":5}}
//! ```
//!
//! Lines that fail to parse are treated as plain text; if no structured
//! text has been found by the end, the first such line is the provisional
//! response, and the raw trimmed output is the last resort.

use super::{strip_code_fence, usage_from_value};
use crate::process::scan::classify_failure_text;
use gengate_domain::{GenerationResponse, InvokeError, TokenUsage, ToolId};
use serde_json::Value;
use tracing::debug;

/// Decode a line-delimited record stream.
///
/// Error/failed records abort decoding immediately with the same
/// text-scanning classification the invoker applies to non-zero exits.
pub fn decode_record_stream(
    tool: ToolId,
    model: &str,
    raw: &str,
    extra_auth_markers: &[&str],
) -> Result<GenerationResponse, InvokeError> {
    let mut structured_text: Option<String> = None;
    let mut provisional: Option<String> = None;
    let mut usage: Option<TokenUsage> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Ok(record) = serde_json::from_str::<Value>(line) else {
            if structured_text.is_none() && provisional.is_none() {
                provisional = Some(line.to_string());
            }
            continue;
        };

        let kind = record.get("type").and_then(Value::as_str).unwrap_or("");

        if kind.ends_with(".started") {
            if let Some(id) = record
                .get("thread_id")
                .or_else(|| record.get("session_id"))
                .and_then(Value::as_str)
            {
                debug!(tool = %tool, session_id = %id, "stream session started");
            }
            continue;
        }

        if kind == "item.completed" {
            let text = record
                .get("item")
                .and_then(|item| item.get("text").or_else(|| item.get("content")))
                .and_then(Value::as_str);
            if let Some(text) = text
                && !text.is_empty()
            {
                // Later completions supersede earlier ones (a run can emit
                // intermediate reasoning items before the final message).
                structured_text = Some(text.to_string());
            }
            continue;
        }

        if kind == "turn.completed" {
            if let Some(u) = record.get("usage").and_then(usage_from_value) {
                usage = Some(u);
            }
            continue;
        }

        if kind == "error" || kind.ends_with(".failed") {
            let message = record
                .get("message")
                .or_else(|| record.get("error").and_then(|e| e.get("message")))
                .and_then(Value::as_str)
                .unwrap_or(line);
            return Err(classify_failure_text(
                tool,
                model,
                None,
                message,
                extra_auth_markers,
            ));
        }
    }

    let text = structured_text
        .or(provisional)
        .map(|t| strip_code_fence(&t))
        .unwrap_or_else(|| raw.trim().to_string());

    if text.is_empty() {
        return Err(InvokeError::Decode {
            reason: "empty response".into(),
        });
    }

    let mut response = GenerationResponse::new(text);
    response.usage = usage;
    Ok(response)
}
