//! Per-provider descriptors.
//!
//! Everything that differs between providers is data, not code: argument
//! templates, model aliases, environment variables, auth error phrases,
//! and which decoder understands the tool's output. The CLI and API
//! tiers are written once and parametrized by these tables.

use gengate_domain::{Model, ToolId};

/// How a CLI's stdout is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// One structured record for the whole output.
    Envelope,
    /// One self-describing JSON record per line.
    RecordStream,
}

/// Which hosted API family serves this provider on the direct tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFamily {
    Gemini,
    OpenAi,
}

/// Argument template for one CLI invocation style.
#[derive(Debug, Clone, Copy)]
pub struct CliTemplate {
    /// Sub-command and fixed flags, before model selection.
    pub leading: &'static [&'static str],
    /// Flag that selects the model.
    pub model_flag: &'static str,
    /// Trailing argument that tells the tool to read the prompt from
    /// stdin, for tools that need one.
    pub stdin_sentinel: Option<&'static str>,
    pub shape: OutputShape,
}

/// Static description of one logical provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderDescriptor {
    pub name: &'static str,
    pub native_tool: ToolId,
    pub native: CliTemplate,
    pub bridge: CliTemplate,
    /// Namespace prepended to the model name for the bridge CLI
    /// (OpenCode addresses models as `<provider>/<model>`).
    pub bridge_model_prefix: &'static str,
    /// Model-selection environment variable honored by the native CLI.
    pub model_env: Option<&'static str>,
    /// Logical model name -> vendor CLI model name, where they differ.
    pub model_aliases: &'static [(&'static str, &'static str)],
    /// Tool-specific auth failure phrases, on top of the common set.
    pub auth_markers: &'static [&'static str],
    pub api: ApiFamily,
    /// Credential variable whose presence enables the direct API tier.
    pub api_key_env: &'static str,
}

impl ProviderDescriptor {
    /// Vendor CLI name for a logical model.
    pub fn cli_model_name(&self, model: &Model) -> String {
        let name = model.as_str();
        self.model_aliases
            .iter()
            .find(|(logical, _)| *logical == name)
            .map(|(_, vendor)| vendor.to_string())
            .unwrap_or_else(|| name.to_string())
    }

    /// Bridge-CLI name for a logical model (`<provider>/<model>`).
    pub fn bridge_model_name(&self, model: &Model) -> String {
        format!("{}{}", self.bridge_model_prefix, self.cli_model_name(model))
    }
}

/// Bridge template shared by both providers: OpenCode launcher with the
/// capability sub-command and structured output.
const OPENCODE_BRIDGE: CliTemplate = CliTemplate {
    leading: &["run", "--json"],
    model_flag: "--model",
    stdin_sentinel: None,
    shape: OutputShape::Envelope,
};

pub const GEMINI: ProviderDescriptor = ProviderDescriptor {
    name: "gemini",
    native_tool: ToolId::GeminiCli,
    native: CliTemplate {
        leading: &["--output-format", "json", "--approval-mode", "yolo"],
        model_flag: "--model",
        stdin_sentinel: None,
        shape: OutputShape::Envelope,
    },
    bridge: OPENCODE_BRIDGE,
    bridge_model_prefix: "google/",
    model_env: Some("GEMINI_MODEL"),
    model_aliases: &[],
    auth_markers: &["gcloud auth", "oauth"],
    api: ApiFamily::Gemini,
    api_key_env: "GEMINI_API_KEY",
};

pub const CODEX: ProviderDescriptor = ProviderDescriptor {
    name: "codex",
    native_tool: ToolId::CodexCli,
    native: CliTemplate {
        leading: &["exec", "--json", "--skip-git-repo-check"],
        model_flag: "--model",
        stdin_sentinel: Some("-"),
        shape: OutputShape::RecordStream,
    },
    bridge: OPENCODE_BRIDGE,
    bridge_model_prefix: "openai/",
    model_env: None,
    model_aliases: &[("gpt-5-mini", "gpt-5-minimal")],
    auth_markers: &["codex login", "signin"],
    api: ApiFamily::OpenAi,
    api_key_env: "OPENAI_API_KEY",
};

/// Resolve the descriptor for a model's provider family.
///
/// Unknown custom models route to Gemini, the default provider of the
/// content pipeline.
pub fn descriptor_for(model: &Model) -> &'static ProviderDescriptor {
    if model.is_gpt() { &CODEX } else { &GEMINI }
}
