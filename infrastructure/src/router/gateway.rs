//! Tiered generation gateway.
//!
//! Implements the [`TextGenerator`] port by assembling a fresh fallback
//! chain for every request: bridge CLI, then the provider's native CLI,
//! then the direct API. Assembly happens per request on purpose — tool
//! availability and environment flags are probed at call time, never
//! cached, so installing or logging into a tool takes effect on the next
//! request.

use crate::config::{
    EnvSnapshot, FileConfig, env_snapshot, has_credential, tool_enabled, tool_path_override,
};
use crate::probe::detect_tool;
use crate::router::{FallbackRouter, Tier};
use crate::tiers::api::ApiTier;
use crate::tiers::cli::{CliRole, CliTier};
use crate::tiers::descriptor::descriptor_for;
use async_trait::async_trait;
use gengate_application::TextGenerator;
use gengate_domain::{GenerationRequest, GenerationResponse, InvokeError, Model, ToolId};
use std::sync::Arc;
use tracing::{debug, info};

/// The production [`TextGenerator`]: routes requests across the three
/// execution tiers.
pub struct TieredGenerator {
    config: FileConfig,
    /// Test seam. `None` means read the live process environment on each
    /// request.
    env_override: Option<EnvSnapshot>,
}

impl TieredGenerator {
    pub fn new(config: FileConfig) -> Self {
        Self {
            config,
            env_override: None,
        }
    }

    /// Replace the live environment with a fixed snapshot.
    pub fn with_env_snapshot(mut self, env: EnvSnapshot) -> Self {
        self.env_override = Some(env);
        self
    }

    fn snapshot(&self) -> EnvSnapshot {
        match &self.env_override {
            Some(env) => env.clone(),
            None => env_snapshot(),
        }
    }

    async fn cli_stage(
        &self,
        env: &EnvSnapshot,
        role: CliRole,
        tool: ToolId,
    ) -> Option<CliTier> {
        let tool_config = self.config.tools.tool(tool);
        if !tool_enabled(env, tool, tool_config) {
            debug!(tool = %tool, "tool disabled, skipping tier");
            return None;
        }

        let override_path = tool_path_override(env, tool, tool_config);
        let detection = detect_tool(tool, override_path.as_deref()).await;
        let Some(program) = detection.path else {
            debug!(tool = %tool, error = ?detection.error, "tool unavailable, skipping tier");
            return None;
        };

        Some(
            CliTier::new(role, tool, program, env.clone())
                .with_retry_options(self.config.retry.options()),
        )
    }

    /// Build the fallback chain for one request.
    pub(crate) async fn assemble(&self, model: &Model) -> FallbackRouter {
        let env = self.snapshot();
        let descriptor = descriptor_for(model);
        let mut router = FallbackRouter::new();

        if let Some(tier) = self
            .cli_stage(&env, CliRole::Bridge, ToolId::Opencode)
            .await
        {
            router.push(Tier::Bridge, Arc::new(tier));
        }

        if let Some(tier) = self
            .cli_stage(&env, CliRole::Native, descriptor.native_tool)
            .await
        {
            router.push(Tier::Native, Arc::new(tier));
        }

        if self.config.api.enabled && has_credential(&env, descriptor.api_key_env) {
            let tier = ApiTier::new(env)
                .with_base_urls(
                    self.config.api.gemini_base_url.clone(),
                    self.config.api.openai_base_url.clone(),
                )
                .with_retry_options(self.config.retry.options());
            router.push(Tier::Api, Arc::new(tier));
        }

        router
    }
}

#[async_trait]
impl TextGenerator for TieredGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, InvokeError> {
        let router = self.assemble(&request.model).await;
        debug!(model = %request.model, stages = router.len(), "tier chain assembled");

        let outcome = router.generate(request).await?;
        info!(
            tier = %outcome.tier,
            served_by = %outcome.served_by,
            attempts = outcome.tiers_attempted.len(),
            "generation served"
        );
        Ok(outcome.response)
    }
}
