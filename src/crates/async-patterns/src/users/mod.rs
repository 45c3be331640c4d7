//! Simulated user lookup
//!
//! [`UserDirectory`] is the single source of success and failure for every
//! pattern in this crate. Identifiers 1 and 2 resolve to fixed records; any
//! other identifier fails with [`PatternError::NotFound`]. Both outcomes
//! arrive after the same simulated latency.

use crate::config::PatternsConfig;
use crate::{PatternError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A user record produced by a successful lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl UserRecord {
    fn known(id: u64) -> Option<Self> {
        let (name, email) = match id {
            1 => ("John Doe", "john@example.com"),
            2 => ("Jane Smith", "jane@example.com"),
            _ => return None,
        };

        Some(Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

/// Render a record the way the aggregators report successes
///
/// ```rust,ignore
/// assert_eq!(format_user(&user), "John Doe (john@example.com)");
/// ```
pub fn format_user(user: &UserRecord) -> String {
    format!("{} ({})", user.name, user.email)
}

/// Point lookup over the two known users
///
/// Clones share the lookup counter, so a directory handed to spawned tasks or
/// to a stream still reports the total number of lookups started.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    latency: Duration,
    lookups: Arc<AtomicUsize>,
}

impl UserDirectory {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_config(config: &PatternsConfig) -> Self {
        Self::new(config.lookup_latency())
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Number of lookups started through this directory or any of its clones
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Look up a user by identifier after the simulated latency
    pub async fn fetch_user(&self, id: u64) -> Result<UserRecord> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(user_id = id, "Fetching user");

        tokio::time::sleep(self.latency).await;

        UserRecord::known(id).ok_or(PatternError::NotFound(id))
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::from_config(&PatternsConfig::default())
    }
}
