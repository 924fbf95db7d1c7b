//! Tier adapters: the three execution paths behind one contract.
//!
//! A logical provider (Gemini, Codex) can be reached through the
//! OpenCode bridge CLI, its own vendor CLI, or its HTTP API. Each path is
//! a [`TierClient`]; the per-provider differences (flags, model aliases,
//! decoders, error phrases) live in one [`descriptor`] table instead of
//! per-provider adapter copies.

pub mod api;
pub mod cli;
pub mod descriptor;

use async_trait::async_trait;
use gengate_domain::{GenerationRequest, GenerationResponse, InvokeError};

/// One execution path for a generation request.
///
/// Implementations wrap their own attempts with the retry engine; the
/// fallback router treats each `generate` call as a single, final
/// verdict for that tier.
#[async_trait]
pub trait TierClient: Send + Sync {
    /// Audit label recorded in `tiers_attempted` (e.g. `cli:gemini`).
    fn label(&self) -> String;

    /// Attempt the request on this tier.
    async fn generate(&self, request: &GenerationRequest)
    -> Result<GenerationResponse, InvokeError>;
}
