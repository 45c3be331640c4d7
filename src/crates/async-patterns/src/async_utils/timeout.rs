//! Timeout utilities for async operations
//!
//! Races an operation against a deadline. Whichever settles first decides the
//! outcome. [`with_timeout`] drops the pending operation when the deadline
//! wins; [`with_timeout_detached`] lets it run to completion in the
//! background and only gates what the caller sees.

use crate::{PatternError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout as tokio_timeout;

/// Execute an async operation with a timeout
///
/// If the operation settles first, its success or failure is returned and the
/// deadline timer is released. If the deadline fires first, the operation is
/// dropped and its late settlement can never be observed.
///
/// # Example
///
/// ```rust,ignore
/// use async_patterns::async_utils::timeout::with_timeout;
/// use std::time::Duration;
///
/// let user = with_timeout(Duration::from_millis(50), directory.fetch_user(1)).await;
/// assert!(user.is_err()); // lookups take 100ms
/// ```
pub async fn with_timeout<F, T, E>(
    duration: Duration,
    operation: F,
) -> std::result::Result<T, TimeoutError<E>>
where
    F: Future<Output = std::result::Result<T, E>>,
{
    match tokio_timeout(duration, operation).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(error)) => Err(TimeoutError::OperationFailed(error)),
        Err(_elapsed) => {
            tracing::debug!("Deadline of {:?} fired before the operation settled", duration);
            Err(TimeoutError::Timeout(duration))
        }
    }
}

/// Execute an async operation with a timeout, leaving it running past the deadline
///
/// The operation is spawned onto the runtime. When the deadline wins, the
/// task is detached rather than aborted: its side effects still happen, but
/// its result is discarded.
pub async fn with_timeout_detached<F, T>(duration: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(operation);

    match tokio_timeout(duration, handle).await {
        Ok(Ok(settled)) => settled,
        Ok(Err(join_error)) => Err(PatternError::InvalidOperation(format!(
            "Timed operation did not complete: {}",
            join_error
        ))),
        Err(_elapsed) => {
            tracing::debug!(
                "Deadline of {:?} fired; operation continues in the background",
                duration
            );
            Err(PatternError::Timeout(duration))
        }
    }
}

/// Error type for timeout operations
#[derive(Debug)]
pub enum TimeoutError<E> {
    /// Operation settled first, with a failure
    OperationFailed(E),
    /// Deadline fired first
    Timeout(Duration),
}

impl<E: std::fmt::Display> std::fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutError::OperationFailed(e) => write!(f, "Operation failed: {}", e),
            TimeoutError::Timeout(d) => write!(f, "Operation timed out after {:?}", d),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimeoutError::OperationFailed(e) => Some(e),
            TimeoutError::Timeout(_) => None,
        }
    }
}

/// Unwraps the operation's own failure unchanged; a missed deadline becomes
/// [`PatternError::Timeout`].
impl From<TimeoutError<PatternError>> for PatternError {
    fn from(error: TimeoutError<PatternError>) -> Self {
        match error {
            TimeoutError::OperationFailed(e) => e,
            TimeoutError::Timeout(d) => PatternError::Timeout(d),
        }
    }
}

/// A deadline shared by several sequential steps
///
/// The clock starts when the guard is created; each [`TimeoutGuard::execute`]
/// call gets only the time that is left.
///
/// ```rust,ignore
/// let guard = TimeoutGuard::new(Duration::from_millis(250));
/// let john = guard.execute(directory.fetch_user(1)).await?;
/// let jane = guard.execute(directory.fetch_user(2)).await?;
/// ```
pub struct TimeoutGuard {
    deadline: tokio::time::Instant,
    duration: Duration,
}

impl TimeoutGuard {
    pub fn new(duration: Duration) -> Self {
        Self {
            deadline: tokio::time::Instant::now() + duration,
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        tokio::time::Instant::now() >= self.deadline
    }

    /// Time left until the deadline, or `None` once it has passed
    pub fn remaining(&self) -> Option<Duration> {
        let now = tokio::time::Instant::now();
        if now >= self.deadline {
            None
        } else {
            Some(self.deadline.duration_since(now))
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub async fn sleep_until_deadline(&self) {
        tokio::time::sleep_until(self.deadline).await;
    }

    /// Execute an operation within the remaining budget
    ///
    /// Fails with `Timeout(duration)` without polling the operation when the
    /// deadline has already passed.
    pub async fn execute<F, T, E>(
        &self,
        operation: F,
    ) -> std::result::Result<T, TimeoutError<E>>
    where
        F: Future<Output = std::result::Result<T, E>>,
    {
        match self.remaining() {
            Some(remaining) => match with_timeout(remaining, operation).await {
                Err(TimeoutError::Timeout(_)) => Err(TimeoutError::Timeout(self.duration)),
                other => other,
            },
            None => Err(TimeoutError::Timeout(self.duration)),
        }
    }
}
