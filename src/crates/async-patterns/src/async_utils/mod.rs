//! Async utilities for common async patterns
//!
//! - Timeout wrappers and shared deadlines
//! - Retry policies with exponential backoff
//! - First-settlement races
//! - Callback to future bridging
//! - Lazy streams that skip failures
//! - Resource scopes with guaranteed cleanup
//!
//! # Example
//!
//! ```rust,ignore
//! use async_patterns::async_utils::retry::{with_retry, RetryPolicy};
//! use async_patterns::async_utils::timeout::with_timeout;
//! use async_patterns::PatternError;
//! use std::time::Duration;
//!
//! // Retry a lookup, giving each attempt 150ms
//! let policy = RetryPolicy::new(3);
//! let user = with_retry(&policy, || async {
//!     with_timeout(Duration::from_millis(150), directory.fetch_user(1))
//!         .await
//!         .map_err(PatternError::from)
//! })
//! .await?;
//! ```

pub mod callback;
pub mod race;
pub mod retry;
pub mod scope;
pub mod stream;
pub mod timeout;
