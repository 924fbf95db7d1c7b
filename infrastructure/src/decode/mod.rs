//! Output decoders for the CLI-backed tiers.
//!
//! Two strategies, selected per tool by its provider descriptor:
//!
//! - [`envelope`]: the whole stdout is one structured record
//!   (Gemini CLI `--output-format json`, OpenCode `run --json`)
//! - [`stream`]: one self-describing JSON record per line, terminated by
//!   completion/error markers (Codex CLI `exec --json`)
//!
//! Vendor output is not standardized, so each heuristic (fence stripping,
//! candidate field probing, grouped-vs-flat usage stats) lives here as an
//! independently testable function with one test vector per observed
//! quirk.

pub mod envelope;
pub mod stream;

use gengate_domain::TokenUsage;
use serde_json::Value;

/// Strip a surrounding markdown code fence from extracted text.
///
/// Providers occasionally wrap the payload in ```` ```json ... ``` ````
/// even when asked for structured output. Only a fence on the very first
/// line is treated as wrapping; fences in the middle of the text belong
/// to the content.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines = trimmed.lines();
    lines.next(); // fence line, possibly with a language tag
    let rest: Vec<&str> = lines.collect();

    let body = match rest.last() {
        Some(last) if last.trim() == "```" => &rest[..rest.len() - 1],
        _ => &rest[..],
    };
    body.join("\n").trim().to_string()
}

/// Probe an object for the first present counter among `names`.
fn counter(obj: &Value, names: &[&str]) -> Option<u64> {
    names.iter().find_map(|n| obj.get(*n)?.as_u64())
}

/// Extract usage counters from one flat stats/usage object.
///
/// Field names vary per vendor; each slot probes an ordered candidate
/// list. Returns `None` when no counter is present at all.
pub fn usage_from_value(obj: &Value) -> Option<TokenUsage> {
    if !obj.is_object() {
        return None;
    }

    let prompt = counter(obj, &["prompt_tokens", "input_tokens", "promptTokenCount", "prompt"]);
    let completion = counter(
        obj,
        &[
            "completion_tokens",
            "output_tokens",
            "candidatesTokenCount",
            "candidates",
            "completion",
        ],
    );
    let total = counter(obj, &["total_tokens", "totalTokenCount", "total"]);
    let thinking = counter(
        obj,
        &["thoughts_tokens", "thoughtsTokenCount", "reasoning_output_tokens", "thoughts"],
    );
    let cached = counter(
        obj,
        &[
            "cached_input_tokens",
            "cachedContentTokenCount",
            "cached_content_tokens",
            "cached",
        ],
    );

    if prompt.is_none()
        && completion.is_none()
        && total.is_none()
        && thinking.is_none()
        && cached.is_none()
    {
        return None;
    }

    let usage = TokenUsage {
        prompt_tokens: prompt.unwrap_or(0),
        completion_tokens: completion.unwrap_or(0),
        total_tokens: total.unwrap_or(0),
        thinking_tokens: thinking,
        cached_prompt_tokens: cached,
    }
    .reconcile();
    Some(usage)
}

/// Extract usage from a stats container that may be grouped by model.
///
/// Observed shapes:
/// - flat: `{"prompt_tokens": 10, ...}` or `{"tokens": {...}}`
/// - grouped: `{"models": {"gemini-2.5-pro": {"tokens": {...}}}}`
///
/// Grouped entries are merged, since a single CLI run can touch more than
/// one model (e.g. a flash model for routing plus the requested one).
pub fn usage_from_stats(stats: &Value) -> Option<TokenUsage> {
    if let Some(models) = stats.get("models").and_then(Value::as_object) {
        let mut merged: Option<TokenUsage> = None;
        for per_model in models.values() {
            let tokens = per_model.get("tokens").unwrap_or(per_model);
            if let Some(usage) = usage_from_value(tokens) {
                merged = Some(match merged {
                    Some(acc) => acc.merge(usage),
                    None => usage,
                });
            }
        }
        return merged;
    }

    if let Some(tokens) = stats.get("tokens") {
        return usage_from_value(tokens);
    }

    usage_from_value(stats)
}
