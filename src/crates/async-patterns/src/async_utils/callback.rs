//! Callback to future bridging
//!
//! A callback-style operation hands its single settlement to a continuation.
//! [`from_callback`] adapts any such operation into a future using a
//! one-shot channel created per call; exactly one of "callback invoked" or
//! "callback dropped" completes it.

use crate::users::{UserDirectory, UserRecord};
use crate::{PatternError, Result};
use tokio::sync::oneshot;

/// Continuation handed to a callback-style operation
pub type Callback<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// Turn a callback-registering function into a future
///
/// `register` receives the continuation and is expected to arrange for it to
/// be called once. The future resolves with whatever the continuation is
/// given, unchanged. If the continuation is dropped without being called,
/// the future fails with [`PatternError::CallbackDropped`].
///
/// ```rust,ignore
/// let user = from_callback(|done| directory.fetch_user_with_callback(1, done)).await?;
/// ```
pub async fn from_callback<T, R>(register: R) -> Result<T>
where
    T: Send + 'static,
    R: FnOnce(Callback<T>),
{
    let (tx, rx) = oneshot::channel();

    register(Box::new(move |result| {
        // The receiver is gone only if the caller stopped waiting
        let _ = tx.send(result);
    }));

    rx.await.unwrap_or(Err(PatternError::CallbackDropped))
}

impl UserDirectory {
    /// Callback-style lookup
    ///
    /// Spawns the lookup onto the current tokio runtime and calls `callback`
    /// exactly once with the record or the lookup error. Must be called from
    /// within a runtime.
    pub fn fetch_user_with_callback<C>(&self, id: u64, callback: C)
    where
        C: FnOnce(Result<UserRecord>) + Send + 'static,
    {
        let directory = self.clone();
        tokio::spawn(async move {
            let result = directory.fetch_user(id).await;
            if let Err(e) = &result {
                tracing::debug!(user_id = id, "Callback lookup failed: {}", e);
            }
            callback(result);
        });
    }

    /// Future-style lookup built on [`UserDirectory::fetch_user_with_callback`]
    ///
    /// Fails with exactly the error the callback form would have received.
    pub async fn fetch_user_via_callback(&self, id: u64) -> Result<UserRecord> {
        from_callback(|done| self.fetch_user_with_callback(id, done)).await
    }
}
