//! Parametrized CLI tier adapter.
//!
//! One implementation covers both CLI-backed tiers: the OpenCode bridge
//! and the vendor native CLIs. The provider descriptor supplies the
//! argument template, model naming, and decoder; this adapter owns the
//! mechanics of environment scrubbing, prompt delivery, invocation, and
//! retry.

use super::TierClient;
use super::descriptor::{CliTemplate, OutputShape, ProviderDescriptor, descriptor_for};
use crate::decode::{envelope::decode_envelope, stream::decode_record_stream};
use crate::process::env::build_process_env;
use crate::process::invoker::{InvocationRequest, invoke};
use crate::retry::{RetryOptions, with_retry};
use async_trait::async_trait;
use gengate_domain::{GenerationRequest, GenerationResponse, InvokeError, ToolId};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Prompts larger than this go through stdin instead of the argument
/// vector, staying clear of OS argv limits.
const PROMPT_ARG_LIMIT: usize = 8 * 1024;

/// Which CLI tier this adapter instance plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliRole {
    Bridge,
    Native,
}

/// A CLI-backed execution tier (bridge or native).
pub struct CliTier {
    role: CliRole,
    tool: ToolId,
    program: PathBuf,
    /// Immutable snapshot of the caller's environment, scrubbed per
    /// invocation (never mutated in place).
    base_env: HashMap<String, String>,
    retry: RetryOptions,
}

impl CliTier {
    pub fn new(
        role: CliRole,
        tool: ToolId,
        program: PathBuf,
        base_env: HashMap<String, String>,
    ) -> Self {
        Self {
            role,
            tool,
            program,
            base_env,
            retry: RetryOptions::quick(),
        }
    }

    pub fn with_retry_options(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    fn template<'d>(&self, descriptor: &'d ProviderDescriptor) -> &'d CliTemplate {
        match self.role {
            CliRole::Bridge => &descriptor.bridge,
            CliRole::Native => &descriptor.native,
        }
    }

    fn model_name(&self, descriptor: &ProviderDescriptor, request: &GenerationRequest) -> String {
        match self.role {
            CliRole::Bridge => descriptor.bridge_model_name(&request.model),
            CliRole::Native => descriptor.cli_model_name(&request.model),
        }
    }

    /// Build the argument vector, stdin payload, and process environment
    /// for one attempt.
    pub(crate) fn build_invocation(
        &self,
        descriptor: &ProviderDescriptor,
        request: &GenerationRequest,
        model_name: &str,
    ) -> InvocationRequest {
        let template = self.template(descriptor);

        let mut args: Vec<String> = template.leading.iter().map(|s| s.to_string()).collect();
        args.push(template.model_flag.to_string());
        args.push(model_name.to_string());

        let input = if request.prompt.len() <= PROMPT_ARG_LIMIT {
            args.push(request.prompt.clone());
            None
        } else {
            if let Some(sentinel) = template.stdin_sentinel {
                args.push(sentinel.to_string());
            }
            Some(request.prompt.clone())
        };

        let mut overrides = HashMap::new();
        if self.role == CliRole::Native
            && let Some(var) = descriptor.model_env
        {
            overrides.insert(var.to_string(), model_name.to_string());
        }

        InvocationRequest {
            args,
            env: build_process_env(&self.base_env, &overrides),
            input,
            timeout: request.timeout,
        }
    }
}

#[async_trait]
impl TierClient for CliTier {
    fn label(&self) -> String {
        match self.role {
            CliRole::Bridge => format!("bridge:{}", self.tool.command()),
            CliRole::Native => format!("cli:{}", self.tool.command()),
        }
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, InvokeError> {
        let descriptor = descriptor_for(&request.model);
        let model_name = self.model_name(descriptor, request);
        let invocation = self.build_invocation(descriptor, request, &model_name);
        let shape = self.template(descriptor).shape;

        let result = with_retry(&self.retry, |attempt| {
            let invocation = invocation.clone();
            let model_name = model_name.clone();
            async move {
                if attempt > 1 {
                    debug!(tool = %self.tool, attempt, "retrying tool invocation");
                }
                let output = invoke(
                    self.tool,
                    &self.program,
                    &model_name,
                    invocation,
                    descriptor.auth_markers,
                )
                .await?;

                match shape {
                    OutputShape::Envelope => decode_envelope(
                        self.tool,
                        &model_name,
                        &output.stdout,
                        descriptor.auth_markers,
                    ),
                    OutputShape::RecordStream => decode_record_stream(
                        self.tool,
                        &model_name,
                        &output.stdout,
                        descriptor.auth_markers,
                    ),
                }
            }
        })
        .await;

        result.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::descriptor::{CODEX, GEMINI};
    use gengate_domain::Model;

    fn base_env() -> HashMap<String, String> {
        HashMap::from([
            ("PATH".to_string(), "/usr/bin".to_string()),
            ("GEMINI_API_KEY".to_string(), "secret".to_string()),
        ])
    }

    fn native_gemini() -> CliTier {
        CliTier::new(
            CliRole::Native,
            ToolId::GeminiCli,
            PathBuf::from("/usr/bin/gemini"),
            base_env(),
        )
    }

    #[test]
    fn labels_follow_role() {
        assert_eq!(native_gemini().label(), "cli:gemini");
        let bridge = CliTier::new(
            CliRole::Bridge,
            ToolId::Opencode,
            PathBuf::from("/usr/bin/opencode"),
            base_env(),
        );
        assert_eq!(bridge.label(), "bridge:opencode");
    }

    #[test]
    fn native_invocation_puts_short_prompt_in_argv() {
        let tier = native_gemini();
        let request = GenerationRequest::new("a red bicycle", Model::Gemini25Pro);
        let invocation = tier.build_invocation(&GEMINI, &request, "gemini-2.5-pro");

        assert_eq!(
            invocation.args,
            vec![
                "--output-format",
                "json",
                "--approval-mode",
                "yolo",
                "--model",
                "gemini-2.5-pro",
                "a red bicycle"
            ]
        );
        assert!(invocation.input.is_none());
        // Scrubbed credentials, inserted model selection.
        assert!(!invocation.env.contains_key("GEMINI_API_KEY"));
        assert_eq!(invocation.env.get("GEMINI_MODEL").unwrap(), "gemini-2.5-pro");
    }

    #[test]
    fn long_prompt_moves_to_stdin() {
        let tier = CliTier::new(
            CliRole::Native,
            ToolId::CodexCli,
            PathBuf::from("/usr/bin/codex"),
            base_env(),
        );
        let long_prompt = "x".repeat(PROMPT_ARG_LIMIT + 1);
        let request = GenerationRequest::new(long_prompt.clone(), Model::Gpt5);
        let invocation = tier.build_invocation(&CODEX, &request, "gpt-5");

        // Codex needs the "-" sentinel to read the prompt from stdin.
        assert_eq!(invocation.args.last().unwrap(), "-");
        assert_eq!(invocation.input.as_deref(), Some(long_prompt.as_str()));
    }

    #[test]
    fn bridge_invocation_uses_namespaced_model() {
        let tier = CliTier::new(
            CliRole::Bridge,
            ToolId::Opencode,
            PathBuf::from("/usr/bin/opencode"),
            base_env(),
        );
        let request = GenerationRequest::new("hello", Model::Gemini25Flash);
        let invocation = tier.build_invocation(&GEMINI, &request, "google/gemini-2.5-flash");

        assert_eq!(
            invocation.args,
            vec!["run", "--json", "--model", "google/gemini-2.5-flash", "hello"]
        );
        // The bridge picks its own provider auth; no model env leaks in.
        assert!(!invocation.env.contains_key("GEMINI_MODEL"));
    }
}
