//! Text generation port
//!
//! Defines the single capability the content pipeline consumes: turn a
//! prompt into text plus usage counters, or fail with a typed error.

use async_trait::async_trait;
use gengate_domain::{GenerationRequest, GenerationResponse, InvokeError};

/// Boundary contract for text generation.
///
/// The implementation (the tiered fallback router) lives in the
/// infrastructure layer. Callers never see which tier satisfied the
/// request; the audit trail stays inside the router and its logs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for one request.
    ///
    /// Retries and cross-tier fallback happen inside; an `Err` here means
    /// every allowed avenue was exhausted or the failure was terminal.
    async fn generate(&self, request: &GenerationRequest)
    -> Result<GenerationResponse, InvokeError>;
}
