//! Domain layer for gengate
//!
//! This crate contains the core types shared by every execution tier:
//! the model catalog, the external tool identifiers, the generation
//! request/response contract, and the typed error taxonomy that drives
//! tier fallback. It has no dependencies on infrastructure concerns.
//!
//! # Core Concepts
//!
//! ## Tiers
//!
//! A generation request can be satisfied through three interchangeable
//! execution paths, tried in priority order:
//!
//! - **Bridge**: a multi-provider meta-CLI (OpenCode) that can itself
//!   target different providers
//! - **Native**: the vendor's own CLI (Gemini CLI, Codex CLI)
//! - **API**: a direct network call to the provider's hosted service
//!
//! ## Tier-recoverable errors
//!
//! [`InvokeError::is_tier_recoverable`] classifies failures for which
//! trying the next tier is expected to plausibly succeed (tool missing,
//! not logged in, timed out, generic tool failure, undecodable output).

pub mod core;
pub mod generation;

// Re-export commonly used types
pub use core::{error::InvokeError, model::Model, tool::ToolId};
pub use generation::{
    request::{GenerationRequest, GenerationResponse},
    usage::TokenUsage,
};
