//! Retry logic with exponential backoff
//!
//! Which failures are worth another attempt is data on the policy
//! (`retry_on`), not a property baked into the error type.
//!
//! # Example
//!
//! ```rust,ignore
//! use ai_core::retry::{RetryPolicy, with_retry};
//!
//! let policy = RetryPolicy::default();
//! let result = with_retry(&policy, || async {
//!     client.call().await
//! }).await;
//! ```

use std::future::Future;
use std::time::Duration;

use domain::ErrorKind;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Retry behaviour for calls to the model backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of calls, including the first one (values below 1 act as 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Lower bound for the delay between calls in milliseconds
    #[serde(default = "default_min_backoff")]
    pub min_backoff_ms: u64,

    /// Upper bound for the delay between calls in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Multiplier for exponential backoff
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Maximum jitter as a fraction of the delay (0.0 disables jitter)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,

    /// Error kinds that trigger another attempt
    #[serde(default = "default_retry_on")]
    pub retry_on: Vec<ErrorKind>,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_min_backoff() -> u64 {
    1_000
}

const fn default_max_backoff() -> u64 {
    10_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.1
}

fn default_retry_on() -> Vec<ErrorKind> {
    vec![ErrorKind::ConnectionFailure, ErrorKind::Timeout]
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            min_backoff_ms: default_min_backoff(),
            max_backoff_ms: default_max_backoff(),
            multiplier: default_multiplier(),
            jitter_factor: default_jitter_factor(),
            retry_on: default_retry_on(),
        }
    }
}

impl RetryPolicy {
    /// Policy with no delay between attempts
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            min_backoff_ms: 0,
            max_backoff_ms: 0,
            jitter_factor: 0.0,
            ..Self::default()
        }
    }

    /// Set the total number of calls
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Also retry on `kind`
    #[must_use]
    pub fn retrying(mut self, kind: ErrorKind) -> Self {
        if !self.retry_on.contains(&kind) {
            self.retry_on.push(kind);
        }
        self
    }

    /// Disable jitter
    #[must_use]
    pub const fn without_jitter(mut self) -> Self {
        self.jitter_factor = 0.0;
        self
    }

    /// Effective number of calls, never below one
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether a failure of `kind` should be retried
    #[must_use]
    pub fn should_retry(&self, kind: ErrorKind) -> bool {
        self.retry_on.contains(&kind)
    }

    /// Delay before the call following failed attempt `attempt` (0-indexed)
    ///
    /// `min_backoff * multiplier^attempt` with jitter, always kept within
    /// `[min_backoff, max_backoff]`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let min = self.min_backoff_ms as f64;
        let max = (self.max_backoff_ms as f64).max(min);
        let base = (min * self.multiplier.powi(attempt.min(64) as i32)).clamp(min, max);

        let delay = if self.jitter_factor > 0.0 && base > 0.0 {
            let range = base * self.jitter_factor;
            let jitter = rand::rng().random_range(-range..=range);
            (base + jitter).clamp(min, max)
        } else {
            base
        };

        Duration::from_millis(delay as u64)
    }
}

/// Errors that can name their `ErrorKind`
pub trait Classify {
    /// The classification used for retry decisions and user-facing records
    fn kind(&self) -> ErrorKind;
}

/// Final result plus attempt metadata
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The result of the last attempt
    pub result: Result<T, E>,
    /// Number of calls made (1 = no retries)
    pub attempts: u32,
    /// Total time spent including delays
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    /// Check if the operation succeeded
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Check if the operation failed
    #[must_use]
    pub const fn is_err(&self) -> bool {
        self.result.is_err()
    }

    /// Convert to standard Result, discarding metadata
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Execute an async operation under `policy`
///
/// Stops at the first success, at the first error whose kind is not in
/// `retry_on`, or after `policy.attempts()` calls.
#[allow(clippy::cast_possible_truncation)]
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + std::fmt::Display,
{
    let start = std::time::Instant::now();
    let max_attempts = policy.attempts();
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(
                        attempts,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Operation succeeded after retries"
                    );
                }
                return RetryResult {
                    result: Ok(value),
                    attempts,
                    total_duration: start.elapsed(),
                };
            },
            Err(err) => {
                let kind = err.kind();

                if !policy.should_retry(kind) {
                    debug!(attempts, kind = %kind, error = %err, "Operation failed with non-retryable error");
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                if attempts >= max_attempts {
                    warn!(attempts, kind = %kind, error = %err, "Operation failed after max attempts");
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                let delay = policy.delay_for_attempt(attempts - 1);
                warn!(
                    attempt = attempts,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, retrying"
                );

                tokio::time::sleep(delay).await;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Clone)]
    struct TestError(ErrorKind);

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error: {}", self.0)
        }
    }

    impl Classify for TestError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    #[test]
    fn policy_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.min_backoff_ms, 1_000);
        assert_eq!(policy.max_backoff_ms, 10_000);
        assert!(policy.should_retry(ErrorKind::ConnectionFailure));
        assert!(policy.should_retry(ErrorKind::Timeout));
        assert!(!policy.should_retry(ErrorKind::ModelNotFound));
        assert!(!policy.should_retry(ErrorKind::MalformedResponse));
    }

    #[test]
    fn zero_attempts_means_one_call() {
        assert_eq!(RetryPolicy::default().with_max_attempts(0).attempts(), 1);
    }

    #[test]
    fn retrying_adds_kind_once() {
        let policy = RetryPolicy::default()
            .retrying(ErrorKind::MalformedResponse)
            .retrying(ErrorKind::MalformedResponse);
        assert_eq!(policy.retry_on.len(), 3);
        assert!(policy.should_retry(ErrorKind::MalformedResponse));
    }

    #[test]
    fn delay_grows_exponentially_without_jitter() {
        let policy = RetryPolicy {
            min_backoff_ms: 100,
            ..RetryPolicy::default()
        }
        .without_jitter();

        assert_eq!(policy.delay_for_attempt(0).as_millis(), 100);
        assert_eq!(policy.delay_for_attempt(1).as_millis(), 200);
        assert_eq!(policy.delay_for_attempt(2).as_millis(), 400);
    }

    #[test]
    fn delay_capped_at_max() {
        let policy = RetryPolicy {
            min_backoff_ms: 1_000,
            max_backoff_ms: 2_000,
            ..RetryPolicy::default()
        }
        .without_jitter();

        assert_eq!(policy.delay_for_attempt(1).as_millis(), 2_000);
        assert_eq!(policy.delay_for_attempt(200).as_millis(), 2_000);
    }

    #[test]
    fn jittered_delay_stays_within_bounds() {
        let policy = RetryPolicy {
            min_backoff_ms: 1_000,
            max_backoff_ms: 10_000,
            jitter_factor: 0.5,
            ..RetryPolicy::default()
        };

        for attempt in 0..8 {
            let ms = policy.delay_for_attempt(attempt).as_millis();
            assert!((1_000..=10_000).contains(&ms), "attempt {attempt}: {ms}ms");
        }
    }

    #[test]
    fn policy_deserializes_kinds_from_snake_case() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"max_attempts":5,"retry_on":["timeout"]}"#).unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.retry_on, vec![ErrorKind::Timeout]);
        assert_eq!(policy.min_backoff_ms, 1_000);
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let result = with_retry(&RetryPolicy::immediate(3), || async {
            Ok::<_, TestError>(42)
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(result.attempts, 1);
        assert_eq!(result.into_result().unwrap(), 42);
    }

    #[tokio::test]
    async fn k_failures_then_success_makes_k_plus_one_calls() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = with_retry(&RetryPolicy::immediate(5), || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 3 {
                    Err(TestError(ErrorKind::ConnectionFailure))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(result.attempts, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn stops_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = with_retry(&RetryPolicy::immediate(3), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError(ErrorKind::Timeout))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(result.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_kind_short_circuits() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = with_retry(&RetryPolicy::immediate(5), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError(ErrorKind::ServerFault))
            }
        })
        .await;

        assert_eq!(result.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.into_result().unwrap_err().0, ErrorKind::ServerFault);
    }

    #[tokio::test]
    async fn retry_set_is_data() {
        let policy = RetryPolicy::immediate(2).retrying(ErrorKind::MalformedResponse);
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = with_retry(&policy, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError(ErrorKind::MalformedResponse))
            }
        })
        .await;

        assert_eq!(result.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    mod backoff_properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn delay_stays_within_bounds(
                min in 0u64..5_000,
                extra in 0u64..60_000,
                attempt in 0u32..100,
                jitter in 0.0f64..1.0,
            ) {
                let policy = RetryPolicy {
                    min_backoff_ms: min,
                    max_backoff_ms: min + extra,
                    jitter_factor: jitter,
                    ..RetryPolicy::default()
                };
                let delay = policy.delay_for_attempt(attempt).as_millis();
                prop_assert!(delay >= u128::from(min));
                prop_assert!(delay <= u128::from(min + extra));
            }

            #[test]
            fn delay_without_jitter_never_shrinks(min in 1u64..1_000, attempt in 0u32..20) {
                let policy = RetryPolicy {
                    min_backoff_ms: min,
                    max_backoff_ms: 120_000,
                    ..RetryPolicy::default()
                }
                .without_jitter();
                prop_assert!(policy.delay_for_attempt(attempt + 1) >= policy.delay_for_attempt(attempt));
            }
        }
    }
}
