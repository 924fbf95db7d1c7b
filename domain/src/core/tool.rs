//! Identifiers for the external CLI tools that back the bridge and
//! native execution tiers.

use serde::{Deserialize, Serialize};

/// Supported external tools (Value Object)
///
/// Used as a map key throughout the infrastructure layer, and carried on
/// every typed error so diagnostics name the tool that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    /// OpenCode, the multi-provider bridge CLI.
    Opencode,
    /// Gemini CLI, Google's vendor CLI.
    GeminiCli,
    /// Codex CLI, OpenAI's vendor CLI.
    CodexCli,
}

impl ToolId {
    /// The executable name looked up on `$PATH`.
    pub fn command(&self) -> &'static str {
        match self {
            ToolId::Opencode => "opencode",
            ToolId::GeminiCli => "gemini",
            ToolId::CodexCli => "codex",
        }
    }

    /// Stable identifier used in config keys and audit labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::Opencode => "opencode",
            ToolId::GeminiCli => "gemini-cli",
            ToolId::CodexCli => "codex-cli",
        }
    }

    /// Environment variable that enables/disables this tool
    /// (`true`/`1`/`yes`, case-insensitive).
    pub fn enable_env(&self) -> &'static str {
        match self {
            ToolId::Opencode => "USE_OPENCODE",
            ToolId::GeminiCli => "USE_GEMINI_CLI",
            ToolId::CodexCli => "USE_CODEX_CLI",
        }
    }

    /// Environment variable holding a custom executable path override.
    pub fn path_env(&self) -> &'static str {
        match self {
            ToolId::Opencode => "OPENCODE_PATH",
            ToolId::GeminiCli => "GEMINI_CLI_PATH",
            ToolId::CodexCli => "CODEX_CLI_PATH",
        }
    }

    /// Whether the tool is attempted when no enable flag is set.
    ///
    /// The bridge defaults off (it shells out to yet another tool chain);
    /// vendor CLIs default on.
    pub fn enabled_by_default(&self) -> bool {
        !matches!(self, ToolId::Opencode)
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        assert_eq!(ToolId::Opencode.command(), "opencode");
        assert_eq!(ToolId::GeminiCli.command(), "gemini");
        assert_eq!(ToolId::CodexCli.command(), "codex");
    }

    #[test]
    fn test_bridge_disabled_by_default() {
        assert!(!ToolId::Opencode.enabled_by_default());
        assert!(ToolId::GeminiCli.enabled_by_default());
        assert!(ToolId::CodexCli.enabled_by_default());
    }

    #[test]
    fn test_env_names() {
        assert_eq!(ToolId::GeminiCli.enable_env(), "USE_GEMINI_CLI");
        assert_eq!(ToolId::GeminiCli.path_env(), "GEMINI_CLI_PATH");
    }
}
