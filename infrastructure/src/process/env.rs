//! Process environment construction for CLI tiers.
//!
//! CLI tools must authenticate through their own login flow, not through
//! whatever API keys happen to sit in the caller's environment. Each
//! invocation therefore gets a fresh environment map: a copy of the
//! caller's snapshot with provider credentials removed and tier-specific
//! variables layered on top. The snapshot itself is never mutated, which
//! keeps concurrent invocations independent.

use std::collections::HashMap;

/// Provider credential variables stripped before spawning a CLI tool.
///
/// Their absence forces the tool down its own authentication path, so an
/// expired key in the parent environment cannot shadow a valid login.
pub const CREDENTIAL_DENY_LIST: &[&str] = &[
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "GOOGLE_GENAI_API_KEY",
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "OPENROUTER_API_KEY",
];

/// Build the environment for one subprocess invocation.
///
/// Copies `base`, deletes the credential deny-list, then inserts
/// `overrides` (model-selection variables and other tier-specific
/// configuration). Overrides win over the base copy, so a tier may
/// deliberately re-introduce a deny-listed variable.
pub fn build_process_env(
    base: &HashMap<String, String>,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut env = base.clone();
    for key in CREDENTIAL_DENY_LIST {
        env.remove(*key);
    }
    for (key, value) in overrides {
        env.insert(key.clone(), value.clone());
    }
    env
}
