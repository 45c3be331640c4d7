//! Async patterns over a simulated user lookup
//!
//! A small library of independent asynchronous utilities, all composed over
//! one data source: [`users::UserDirectory`], which resolves identifiers 1 and
//! 2 and fails every other identifier with [`PatternError::NotFound`].
//!
//! # Modules
//!
//! - `users` - The simulated lookup and its records
//! - `aggregate` - Sequential and parallel batch lookups
//! - `async_utils` - Timeout, retry, race, callback bridge, streams and scopes
//! - `config` - Configuration with environment variable loading
//! - `error` - Error type and chain formatting
//! - `logging` - Subscriber setup and timing helpers
//!
//! Everything runs on a single tokio runtime; tests use a paused clock so
//! simulated latencies cost no wall time.

pub mod aggregate;
pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;
pub mod users;

pub use aggregate::{fetch_users_parallel, fetch_users_sequential};
pub use async_utils::race::{race, race_all};
pub use async_utils::retry::{with_retry, with_retry_if, RetryPolicy};
pub use async_utils::scope::{operation_with_cleanup, ResourceScope, ScopePhase};
pub use async_utils::stream::{stream_users, stream_users_logged};
pub use async_utils::timeout::{with_timeout, with_timeout_detached, TimeoutError, TimeoutGuard};
pub use config::PatternsConfig;
pub use error::{PatternError, Result};
pub use users::{format_user, UserDirectory, UserRecord};

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
