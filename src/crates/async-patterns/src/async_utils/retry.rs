//! Retry utilities for async operations
//!
//! Re-invokes a failing operation up to a fixed attempt budget with
//! exponential backoff between attempts. Each call owns its own
//! [`RetryState`]; nothing is shared between concurrent retries.

use crate::{PatternError, Result};
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Configuration for retrying failed operations
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: usize,

    /// Delay after the first failed attempt
    pub base_delay: Duration,

    /// Multiplier applied to the delay after each further failure
    pub backoff_factor: f64,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    /// Whether to scale delays by a random factor in `0.5..=1.5`
    pub jitter: bool,
}

impl RetryPolicy {
    /// Create a new retry policy with the given max attempts
    ///
    /// ```rust
    /// use async_patterns::async_utils::retry::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(3);
    /// assert_eq!(policy.max_attempts, 3);
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    /// ```
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(100),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(30),
            jitter: false,
        }
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait after the 1-based `attempt` has failed
    ///
    /// `base_delay * backoff_factor^(attempt - 1)`, with optional jitter.
    /// The result never exceeds `max_delay`, even when the exponent overflows
    /// what a `Duration` can hold.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as usize) as i32;
        let mut secs = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);

        if self.jitter {
            secs *= rand::thread_rng().gen_range(0.5..=1.5);
        }

        Duration::try_from_secs_f64(secs.max(0.0))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Whether another attempt is allowed after `attempts` have been made
    pub fn should_retry(&self, attempts: usize) -> bool {
        attempts < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Attempt bookkeeping for a single retry invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryState {
    /// Number of attempts started so far (1-based once the first runs)
    pub attempts: usize,

    /// Description of the most recent failure
    pub last_error: Option<String>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of the next attempt
    pub fn begin_attempt(&mut self) -> usize {
        self.attempts += 1;
        self.attempts
    }

    pub fn record_failure(&mut self, error: impl Display) {
        self.last_error = Some(error.to_string());
    }

    /// The error reported once the budget is spent
    pub fn into_error(self) -> PatternError {
        PatternError::RetriesExhausted {
            attempts: self.attempts,
            last_error: self.last_error.unwrap_or_default(),
        }
    }
}

struct Stopped<E> {
    state: RetryState,
    error: E,
    permanent: bool,
}

async fn retry_loop<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut operation: F,
) -> std::result::Result<T, Stopped<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let mut state = RetryState::new();

    loop {
        let attempt = state.begin_attempt();

        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!("Attempt {} succeeded after earlier failures", attempt);
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        tracing::debug!("Attempt {}/{} failed: {}", attempt, policy.max_attempts, error);
        state.record_failure(&error);

        if !is_retryable(&error) {
            return Err(Stopped {
                state,
                error,
                permanent: true,
            });
        }

        if !policy.should_retry(attempt) {
            return Err(Stopped {
                state,
                error,
                permanent: false,
            });
        }

        let delay = policy.delay_for(attempt);
        tracing::debug!("Waiting {:?} before retry", delay);
        tokio::time::sleep(delay).await;
    }
}

fn check_budget(policy: &RetryPolicy) -> Result<()> {
    if policy.max_attempts == 0 {
        return Err(PatternError::InvalidOperation(
            "retry policy must allow at least one attempt".to_string(),
        ));
    }
    Ok(())
}

/// Execute an async operation with retry logic
///
/// Returns the first success. Once `max_attempts` invocations have all
/// failed, fails with [`PatternError::RetriesExhausted`] carrying the attempt
/// count and the last failure's description. There is no delay before the
/// first attempt.
///
/// # Example
///
/// ```rust,ignore
/// use async_patterns::async_utils::retry::{with_retry, RetryPolicy};
///
/// let user = with_retry(&RetryPolicy::new(3), || directory.fetch_user(1)).await?;
/// ```
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    check_budget(policy)?;

    retry_loop(policy, |_: &E| true, operation)
        .await
        .map_err(|stopped| stopped.state.into_error())
}

/// Execute an async operation, retrying only the failures `is_retryable` accepts
///
/// A rejected failure is returned unchanged straight away. Use
/// [`PatternError::is_transient`] to retry deadlines but not missing records.
pub async fn with_retry_if<F, Fut, T, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&PatternError) -> bool,
{
    check_budget(policy)?;

    retry_loop(policy, is_retryable, operation)
        .await
        .map_err(|stopped| {
            if stopped.permanent {
                stopped.error
            } else {
                stopped.state.into_error()
            }
        })
}
