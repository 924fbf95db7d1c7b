//! Retry/backoff engine
//!
//! Wraps an asynchronous operation, classifies each failure against a
//! pluggable predicate, and retries with exponential backoff plus jitter.
//! The jitter factor (uniform in [0.75, 1.25]) desynchronizes concurrent
//! callers so retries don't arrive as a thundering herd.
//!
//! This is the *inner* retry axis: each tier adapter wraps its own
//! attempts here, while the fallback router provides the coarser
//! cross-tier axis on top.

use gengate_domain::InvokeError;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Pluggable failure classification for retries.
pub type RetryPredicate = Arc<dyn Fn(&InvokeError) -> bool + Send + Sync>;

/// Retry configuration. Not mutated after construction.
#[derive(Clone)]
pub struct RetryOptions {
    /// Additional attempts after the first (total attempts = max_retries + 1).
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub predicate: RetryPredicate,
}

impl std::fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish_non_exhaustive()
    }
}

impl RetryOptions {
    /// Few retries, short delays. For low-latency analysis calls where a
    /// stale answer is worse than a missing one.
    pub fn quick() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            predicate: Arc::new(default_retry_predicate),
        }
    }

    /// More retries, longer delays. For generation calls whose failure is
    /// costly to the caller.
    pub fn critical() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            predicate: Arc::new(default_retry_predicate),
        }
    }

    /// Retries only on rate-limit classification, with a longer base
    /// delay to let the quota window move.
    pub fn rate_limit_only() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            predicate: Arc::new(is_rate_limit),
        }
    }

    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&InvokeError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Arc::new(predicate);
        self
    }
}

/// Discriminated outcome of a retried operation, carrying the 1-indexed
/// attempt count for observability.
#[derive(Debug)]
pub enum RetryResult<T> {
    Success { value: T, attempts: u32 },
    Failure { error: InvokeError, attempts: u32 },
}

impl<T> RetryResult<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryResult::Success { attempts, .. } | RetryResult::Failure { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_result(self) -> Result<T, InvokeError> {
        match self {
            RetryResult::Success { value, .. } => Ok(value),
            RetryResult::Failure { error, .. } => Err(error),
        }
    }
}

/// Message substrings indicating a transient network failure.
const NETWORK_MARKERS: &[&str] = &[
    "connection refused",
    "host not found",
    "connection reset",
    "timed out",
    "socket hang up",
    "fetch failed",
];

/// Message substrings indicating a rate-limit condition.
const RATE_LIMIT_MARKERS: &[&str] = &[
    "rate limit",
    "too many requests",
    "quota",
    "resource exhausted",
    "429",
];

/// Message substrings indicating a transient server-side failure.
const SERVER_MARKERS: &[&str] = &[
    "internal server error",
    "service unavailable",
    "overloaded",
    "bad gateway",
];

/// Default classification: retry rate limits, server errors, and common
/// network failures. Auth, missing tools, and bad models are terminal
/// for the attempting tier.
pub fn default_retry_predicate(error: &InvokeError) -> bool {
    match error {
        InvokeError::Api {
            status: Some(status),
            ..
        } => *status == 429 || (500..=599).contains(status),
        InvokeError::Api {
            status: None,
            message,
        } => contains_any(message, NETWORK_MARKERS)
            || contains_any(message, RATE_LIMIT_MARKERS)
            || contains_any(message, SERVER_MARKERS),
        InvokeError::ToolFailed { detail, .. } => {
            contains_any(detail, NETWORK_MARKERS)
                || contains_any(detail, RATE_LIMIT_MARKERS)
                || contains_any(detail, SERVER_MARKERS)
        }
        _ => false,
    }
}

/// Rate-limit-only classification (see [`RetryOptions::rate_limit_only`]).
pub fn is_rate_limit(error: &InvokeError) -> bool {
    match error {
        InvokeError::Api {
            status: Some(429), ..
        } => true,
        InvokeError::Api { message, .. } => contains_any(message, RATE_LIMIT_MARKERS),
        InvokeError::ToolFailed { detail, .. } => contains_any(detail, RATE_LIMIT_MARKERS),
        _ => false,
    }
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

/// Compute the backoff delay before retry number `attempt` (0-indexed).
///
/// `min(max_delay, base_delay * 2^attempt * jitter)` with jitter drawn
/// uniformly from [0.75, 1.25].
pub fn calculate_backoff_delay(attempt: u32, base_delay: Duration, max_delay: Duration) -> Duration {
    let jitter: f64 = rand::thread_rng().gen_range(0.75..=1.25);
    let exponential = base_delay.as_millis() as f64 * 2f64.powi(attempt as i32) * jitter;
    let capped = exponential.min(max_delay.as_millis() as f64);
    Duration::from_millis(capped as u64)
}

/// Run `operation` with retries.
///
/// The operation receives the 1-indexed attempt number. Retrying stops —
/// without consuming a delay — once `max_retries` is exhausted or the
/// predicate rejects the error.
pub async fn with_retry<T, F, Fut>(options: &RetryOptions, mut operation: F) -> RetryResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, InvokeError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation(attempt + 1).await {
            Ok(value) => {
                return RetryResult::Success {
                    value,
                    attempts: attempt + 1,
                };
            }
            Err(error) => {
                if attempt >= options.max_retries || !(options.predicate)(&error) {
                    return RetryResult::Failure {
                        error,
                        attempts: attempt + 1,
                    };
                }
                let delay = calculate_backoff_delay(attempt, options.base_delay, options.max_delay);
                debug!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "retrying after failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Run `operation` with retries and a per-attempt timeout.
///
/// An elapsed timeout is unconditionally retryable on top of the
/// configured predicate — each fresh attempt gets a fresh budget.
pub async fn with_retry_timeout<T, F, Fut>(
    options: &RetryOptions,
    per_attempt_timeout: Duration,
    mut operation: F,
) -> RetryResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, InvokeError>>,
{
    let inner = options.predicate.clone();
    let options = RetryOptions {
        predicate: Arc::new(move |e: &InvokeError| {
            matches!(e, InvokeError::Timeout { .. }) || inner(e)
        }),
        ..options.clone()
    };

    with_retry(&options, |attempt| {
        let fut = operation(attempt);
        async move {
            match tokio::time::timeout(per_attempt_timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(InvokeError::Timeout {
                    tool: None,
                    waited_ms: per_attempt_timeout.as_millis() as u64,
                }),
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use gengate_domain::ToolId;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn retryable_error() -> InvokeError {
        InvokeError::Api {
            status: Some(503),
            message: "service unavailable".into(),
        }
    }

    fn terminal_error() -> InvokeError {
        InvokeError::AuthFailed {
            tool: ToolId::GeminiCli,
            detail: "not logged in".into(),
        }
    }

    fn fast_options(max_retries: u32) -> RetryOptions {
        RetryOptions {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            predicate: Arc::new(default_retry_predicate),
        }
    }

    #[test]
    fn backoff_first_attempt_within_jitter_bounds() {
        let base = Duration::from_millis(1000);
        for _ in 0..50 {
            let delay = calculate_backoff_delay(0, base, Duration::from_secs(60));
            assert!(delay >= Duration::from_millis(750), "{delay:?}");
            assert!(delay <= Duration::from_millis(1250), "{delay:?}");
        }
    }

    #[test]
    fn backoff_is_capped_at_max_delay() {
        let delay =
            calculate_backoff_delay(20, Duration::from_millis(1000), Duration::from_secs(30));
        assert_eq!(delay, Duration::from_secs(30));
    }

    #[test]
    fn default_predicate_classification() {
        assert!(default_retry_predicate(&retryable_error()));
        assert!(default_retry_predicate(&InvokeError::Api {
            status: Some(429),
            message: "slow down".into()
        }));
        assert!(default_retry_predicate(&InvokeError::Api {
            status: None,
            message: "connection refused".into()
        }));
        assert!(!default_retry_predicate(&terminal_error()));
        assert!(!default_retry_predicate(&InvokeError::Api {
            status: Some(400),
            message: "bad request".into()
        }));
    }

    #[test]
    fn tool_failure_text_retries_server_and_transient_conditions() {
        let tool_failed = |detail: &str| InvokeError::ToolFailed {
            tool: ToolId::GeminiCli,
            exit_code: Some(1),
            detail: detail.into(),
        };
        assert!(default_retry_predicate(&tool_failed(
            "upstream returned 503 service unavailable"
        )));
        assert!(default_retry_predicate(&tool_failed("connection reset by peer")));
        assert!(default_retry_predicate(&tool_failed("quota exceeded, retry later")));
        assert!(!default_retry_predicate(&tool_failed("segmentation fault")));
    }

    #[test]
    fn rate_limit_predicate_is_narrow() {
        assert!(is_rate_limit(&InvokeError::Api {
            status: Some(429),
            message: String::new()
        }));
        assert!(!is_rate_limit(&retryable_error()));
    }

    #[tokio::test]
    async fn non_retryable_error_fails_after_one_attempt() {
        let calls = AtomicU32::new(0);
        let result: RetryResult<()> = with_retry(&fast_options(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(terminal_error()) }
        })
        .await;
        assert_eq!(result.attempts(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retryable_error_exhausts_max_retries() {
        let calls = AtomicU32::new(0);
        let result: RetryResult<()> = with_retry(&fast_options(2), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(retryable_error()) }
        })
        .await;
        assert_eq!(result.attempts(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, RetryResult::Failure { .. }));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_options(5), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(retryable_error())
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        match result {
            RetryResult::Success { value, attempts } => {
                assert_eq!(value, 3); // attempt counter is 1-indexed
                assert_eq!(attempts, 3);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timeout_composition_retries_timeouts() {
        let calls = AtomicU32::new(0);
        let result: RetryResult<()> =
            with_retry_timeout(&fast_options(1), Duration::from_millis(20), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        match result {
            RetryResult::Failure { error, attempts } => {
                assert_eq!(attempts, 2);
                assert!(matches!(error, InvokeError::Timeout { .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
