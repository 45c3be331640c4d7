//! Error handling for async patterns
//!
//! Every pattern in this crate settles with a [`PatternError`] on its failure
//! path. The aggregators are the one exception: they turn per-item failures
//! into data so that a single bad identifier never aborts a batch.
//!
//! # Features
//!
//! - `PatternError` covering lookups, deadlines, retry budgets and cleanup
//! - Error chain formatting and root cause extraction
//!
//! # Example
//!
//! ```rust,ignore
//! use async_patterns::error::{format_error_chain, root_cause};
//!
//! match operation_with_cleanup(&config, true).await {
//!     Err(e) => {
//!         eprintln!("{}", format_error_chain(&e));
//!         eprintln!("Root cause: {}", root_cause(&e));
//!     }
//!     Ok(_) => println!("Success!"),
//! }
//! ```

mod context;

pub use context::{error_chain, format_error_chain, root_cause};

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the async patterns
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    /// The lookup was asked for an identifier with no record
    #[error("User {0} not found")]
    NotFound(u64),

    /// The deadline fired before the wrapped operation settled
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Every attempt allowed by the retry policy failed
    #[error("Failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made (always the policy maximum)
        attempts: usize,
        /// Description of the final failure
        last_error: String,
    },

    /// The operation was invoked with arguments it cannot act on
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A callback-style operation dropped its callback without calling it
    #[error("Callback was dropped before it was invoked")]
    CallbackDropped,

    /// Releasing a scoped resource failed
    #[error("Cleanup of resource {resource} failed")]
    CleanupFailed {
        /// Identity of the resource being released
        resource: String,
        /// The failure raised by the cleanup step
        #[source]
        source: Box<PatternError>,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for async pattern operations
pub type Result<T> = std::result::Result<T, PatternError>;

impl PatternError {
    /// Whether a retry has a chance of producing a different outcome
    ///
    /// Only a missed deadline is transient; a missing record or an invalid
    /// request will fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, PatternError::Timeout(_))
    }
}
