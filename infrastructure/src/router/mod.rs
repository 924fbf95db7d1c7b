//! Fallback router: ordered tiers, typed-error-driven transitions.
//!
//! Tiers are attempted in registration order. A tier-recoverable failure
//! (missing tool, auth, timeout, generic tool failure, undecodable
//! output) moves on to the next tier; anything else is the caller's
//! problem and propagates verbatim. Failures from the direct API tier
//! always propagate, whatever their classification — there is no tier
//! after the vendor's own endpoint worth masking it for.

pub mod gateway;

use crate::tiers::TierClient;
use gengate_domain::{GenerationRequest, GenerationResponse, InvokeError};
use std::sync::Arc;
use tracing::{info, warn};

/// The position a client occupies in the fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Meta-CLI that fronts many providers (OpenCode).
    Bridge,
    /// The provider's own CLI tool.
    Native,
    /// Direct HTTP call to the hosted API.
    Api,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bridge => "bridge",
            Tier::Native => "native",
            Tier::Api => "api",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Stage {
    tier: Tier,
    client: Arc<dyn TierClient>,
}

/// A successful routing, with the audit trail of what it took.
#[derive(Debug)]
pub struct RouterOutcome {
    pub response: GenerationResponse,
    /// Tier that produced the response.
    pub tier: Tier,
    /// Label of the serving client (e.g. `cli:gemini`).
    pub served_by: String,
    /// Labels of every tier attempted, in order, the serving one last.
    pub tiers_attempted: Vec<String>,
}

/// Ordered chain of execution tiers for one request.
///
/// Built fresh per request by the gateway, since tier availability
/// depends on probing and environment state at call time.
#[derive(Default)]
pub struct FallbackRouter {
    stages: Vec<Stage>,
}

impl FallbackRouter {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn push(&mut self, tier: Tier, client: Arc<dyn TierClient>) {
        self.stages.push(Stage { tier, client });
    }

    pub fn with(mut self, tier: Tier, client: Arc<dyn TierClient>) -> Self {
        self.push(tier, client);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Run the request down the tier chain.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<RouterOutcome, InvokeError> {
        let mut attempted: Vec<String> = Vec::new();

        for (index, stage) in self.stages.iter().enumerate() {
            let label = stage.client.label();
            let is_last = index + 1 == self.stages.len();

            match stage.client.generate(request).await {
                Ok(response) => {
                    if !attempted.is_empty() {
                        info!(
                            tier = %stage.tier,
                            served_by = %label,
                            fell_through = attempted.join(", "),
                            "request served after fallback"
                        );
                    }
                    attempted.push(label.clone());
                    return Ok(RouterOutcome {
                        response,
                        tier: stage.tier,
                        served_by: label,
                        tiers_attempted: attempted,
                    });
                }
                Err(error) => {
                    // The API tier is the end of the chain semantically
                    // even when stages after it exist; its verdicts stand.
                    if stage.tier == Tier::Api || !error.is_tier_recoverable() {
                        warn!(
                            tier = %stage.tier,
                            served_by = %label,
                            error = %error,
                            "tier failed terminally"
                        );
                        return Err(error);
                    }

                    warn!(
                        tier = %stage.tier,
                        served_by = %label,
                        error = %error,
                        "tier failed, falling through"
                    );
                    attempted.push(label);

                    if is_last {
                        return Err(InvokeError::AllTiersFailed {
                            attempted,
                            last_error: error.to_string(),
                        });
                    }
                }
            }
        }

        Err(InvokeError::AllTiersFailed {
            attempted,
            last_error: "no execution tier is available".to_string(),
        })
    }
}
