//! Configuration file structure (TOML)

use crate::retry::RetryOptions;
use gengate_domain::ToolId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration loaded from `gengate.toml`
///
/// Every field has a default, so an empty (or absent) file is valid.
///
/// ```toml
/// [tools.opencode]
/// enabled = true
///
/// [tools.gemini-cli]
/// path = "/opt/google/gemini"
///
/// [retry]
/// max_retries = 4
/// base_delay_ms = 2000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub tools: FileToolsConfig,
    pub api: FileApiConfig,
    pub retry: FileRetryConfig,
}

/// Per-tool settings (`[tools.<name>]` sections)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolConfig {
    /// Whether this tool may be used. `None` defers to the environment
    /// flag, then the tool's built-in default.
    pub enabled: Option<bool>,
    /// Executable path override. `None` defers to the environment
    /// override, then `$PATH` lookup.
    pub path: Option<PathBuf>,
}

/// Settings for all three CLI tools (`[tools]` section)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileToolsConfig {
    pub opencode: FileToolConfig,
    pub gemini_cli: FileToolConfig,
    pub codex_cli: FileToolConfig,
}

impl FileToolsConfig {
    pub fn tool(&self, tool: ToolId) -> &FileToolConfig {
        match tool {
            ToolId::Opencode => &self.opencode,
            ToolId::GeminiCli => &self.gemini_cli,
            ToolId::CodexCli => &self.codex_cli,
        }
    }
}

/// Direct API tier settings (`[api]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Whether the direct API tier may be used at all. Credentials in the
    /// environment still gate each provider individually.
    pub enabled: bool,
    pub gemini_base_url: String,
    pub openai_base_url: String,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
        }
    }
}

/// Per-tier retry tuning (`[retry]` section)
///
/// Unset fields keep the built-in quick profile values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

impl FileRetryConfig {
    /// Materialize [`RetryOptions`], starting from the quick profile.
    pub fn options(&self) -> RetryOptions {
        let mut options = RetryOptions::quick();
        if let Some(max_retries) = self.max_retries {
            options.max_retries = max_retries;
        }
        if let Some(ms) = self.base_delay_ms {
            options.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            options.max_delay = Duration::from_millis(ms);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.api.enabled);
        assert!(config.tools.opencode.enabled.is_none());
        assert!(config.tools.gemini_cli.path.is_none());
    }

    #[test]
    fn test_deserialize_tool_sections() {
        let toml_str = r#"
[tools.opencode]
enabled = true

[tools.gemini-cli]
path = "/opt/google/gemini"

[tools.codex-cli]
enabled = false
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tools.opencode.enabled, Some(true));
        assert_eq!(
            config.tools.tool(ToolId::GeminiCli).path,
            Some(PathBuf::from("/opt/google/gemini"))
        );
        assert_eq!(config.tools.codex_cli.enabled, Some(false));
    }

    #[test]
    fn test_retry_overrides() {
        let toml_str = r#"
[retry]
max_retries = 4
base_delay_ms = 2000
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let options = config.retry.options();
        assert_eq!(options.max_retries, 4);
        assert_eq!(options.base_delay, Duration::from_secs(2));
        // Unset fields keep the quick profile value.
        assert_eq!(options.max_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_api_base_url_override() {
        let toml_str = r#"
[api]
gemini_base_url = "http://localhost:8080"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.gemini_base_url, "http://localhost:8080");
        assert_eq!(config.api.openai_base_url, "https://api.openai.com");
    }
}
