//! Infrastructure layer for gengate
//!
//! This crate contains the adapters behind the [`TextGenerator`] port:
//! the tool availability prober, the subprocess invoker, the per-tier
//! output decoders, the retry/backoff engine, the parametrized tier
//! adapters, and the fallback router that strings the tiers together.
//!
//! [`TextGenerator`]: gengate_application::TextGenerator

pub mod config;
pub mod decode;
pub mod probe;
pub mod process;
pub mod retry;
pub mod router;
pub mod tiers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, EnvSnapshot, FileApiConfig, FileConfig, FileRetryConfig, FileToolConfig,
    FileToolsConfig,
};
pub use probe::{Detection, detect_tool};
pub use process::invoker::{InvocationOutput, InvocationRequest, invoke};
pub use retry::{RetryOptions, RetryResult, calculate_backoff_delay, with_retry, with_retry_timeout};
pub use router::{FallbackRouter, RouterOutcome, Tier, gateway::TieredGenerator};
pub use tiers::TierClient;
