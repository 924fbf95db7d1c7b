//! Environment-driven toggles.
//!
//! Tier assembly reads a point-in-time snapshot of the process
//! environment rather than `std::env` directly, so tests (and embedders)
//! can inject their own view without mutating global state.

use super::file_config::FileToolConfig;
use gengate_domain::ToolId;
use std::collections::HashMap;
use std::path::PathBuf;

/// Snapshot of the process environment at request time.
pub type EnvSnapshot = HashMap<String, String>;

/// Capture the current process environment.
pub fn env_snapshot() -> EnvSnapshot {
    std::env::vars().collect()
}

/// Parse an enable-flag value: `true`, `1`, or `yes`, case-insensitive.
pub fn parse_bool_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Whether a tool may be attempted.
///
/// Precedence: environment flag, then the config file, then the tool's
/// built-in default (the bridge defaults off, vendor CLIs on).
pub fn tool_enabled(env: &EnvSnapshot, tool: ToolId, config: &FileToolConfig) -> bool {
    if let Some(value) = env.get(tool.enable_env()) {
        return parse_bool_flag(value);
    }
    config.enabled.unwrap_or_else(|| tool.enabled_by_default())
}

/// Executable path override for a tool, if any.
///
/// Precedence: environment variable, then the config file. `None` means
/// `$PATH` lookup.
pub fn tool_path_override(
    env: &EnvSnapshot,
    tool: ToolId,
    config: &FileToolConfig,
) -> Option<PathBuf> {
    if let Some(value) = env.get(tool.path_env())
        && !value.trim().is_empty()
    {
        return Some(PathBuf::from(value));
    }
    config.path.clone()
}

/// Whether a credential variable is present and non-blank.
pub fn has_credential(env: &EnvSnapshot, var: &str) -> bool {
    env.get(var).is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn flag_parsing_accepts_common_spellings() {
        for value in ["true", "TRUE", "1", "yes", "Yes", " true "] {
            assert!(parse_bool_flag(value), "{value:?}");
        }
        for value in ["false", "0", "no", "", "on"] {
            assert!(!parse_bool_flag(value), "{value:?}");
        }
    }

    #[test]
    fn env_flag_wins_over_config_and_default() {
        let config = FileToolConfig {
            enabled: Some(true),
            path: None,
        };
        let disabled = env(&[("USE_GEMINI_CLI", "false")]);
        assert!(!tool_enabled(&disabled, ToolId::GeminiCli, &config));

        let enabled = env(&[("USE_OPENCODE", "1")]);
        assert!(tool_enabled(&enabled, ToolId::Opencode, &FileToolConfig::default()));
    }

    #[test]
    fn config_wins_over_builtin_default() {
        let config = FileToolConfig {
            enabled: Some(true),
            path: None,
        };
        // Bridge is off by default but the config file turns it on.
        assert!(tool_enabled(&env(&[]), ToolId::Opencode, &config));
    }

    #[test]
    fn builtin_defaults_apply_last() {
        let config = FileToolConfig::default();
        assert!(!tool_enabled(&env(&[]), ToolId::Opencode, &config));
        assert!(tool_enabled(&env(&[]), ToolId::GeminiCli, &config));
        assert!(tool_enabled(&env(&[]), ToolId::CodexCli, &config));
    }

    #[test]
    fn path_override_precedence() {
        let config = FileToolConfig {
            enabled: None,
            path: Some(PathBuf::from("/from/config")),
        };
        let with_env = env(&[("GEMINI_CLI_PATH", "/from/env")]);
        assert_eq!(
            tool_path_override(&with_env, ToolId::GeminiCli, &config),
            Some(PathBuf::from("/from/env"))
        );
        assert_eq!(
            tool_path_override(&env(&[]), ToolId::GeminiCli, &config),
            Some(PathBuf::from("/from/config"))
        );
        assert_eq!(
            tool_path_override(&env(&[]), ToolId::GeminiCli, &FileToolConfig::default()),
            None
        );
    }

    #[test]
    fn blank_credential_is_absent() {
        assert!(!has_credential(&env(&[("GEMINI_API_KEY", "  ")]), "GEMINI_API_KEY"));
        assert!(has_credential(&env(&[("GEMINI_API_KEY", "k")]), "GEMINI_API_KEY"));
        assert!(!has_credential(&env(&[]), "GEMINI_API_KEY"));
    }
}
