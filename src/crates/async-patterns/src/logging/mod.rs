//! Logging setup and timing helpers
//!
//! Timings are taken from `tokio::time::Instant`, so under a paused test
//! clock they report simulated latency rather than wall time. Elapsed time is
//! logged as a structured `elapsed_ms` field.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber writing to stderr
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` when a
/// subscriber is already installed, so repeated calls are harmless.
pub fn init_logging(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Whole milliseconds, saturating
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Await `future` and log how long it took under `operation`
///
/// ```rust,ignore
/// let outcomes = timed("fetch_users_parallel", join_all(lookups)).await;
/// ```
pub async fn timed<F, T>(operation: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let output = future.await;
    debug!(operation, elapsed_ms = millis(start.elapsed()), "completed");
    output
}

/// Logs entry on creation and exit, with elapsed time, on drop
///
/// ```rust
/// use async_patterns::logging::LogGuard;
///
/// let guard = LogGuard::new("scope operation_with_cleanup");
/// assert_eq!(guard.label(), "scope operation_with_cleanup");
/// ```
pub struct LogGuard {
    label: String,
    entered: Instant,
}

impl LogGuard {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        debug!(scope = %label, "entered");
        Self {
            label,
            entered: Instant::now(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn elapsed(&self) -> Duration {
        self.entered.elapsed()
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        debug!(scope = %self.label, elapsed_ms = millis(self.elapsed()), "exited");
    }
}
