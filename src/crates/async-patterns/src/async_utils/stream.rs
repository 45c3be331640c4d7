//! Lazy streams of lookups
//!
//! [`stream_users`] yields the record for every identifier that resolves and
//! skips the ones that fail. Failures go to a diagnostic side channel instead
//! of ending the stream. The stream owns its identifiers, so it is single-pass:
//! once consumed (or dropped) it cannot be restarted.

use crate::users::{UserDirectory, UserRecord};
use crate::PatternError;
use async_stream::stream;
use futures::Stream;

/// Stream the records of `ids`, reporting failures to `on_error`
///
/// No lookup starts until the stream is polled, and each lookup starts only
/// after the previous item was handed to the consumer. Dropping the stream
/// early leaves the remaining identifiers untouched.
///
/// ```rust,ignore
/// use futures::StreamExt;
///
/// let users = stream_users(directory, vec![1, 999, 2], |id, e| eprintln!("{}: {}", id, e));
/// futures::pin_mut!(users);
/// while let Some(user) = users.next().await {
///     println!("{}", user.name);
/// }
/// ```
pub fn stream_users<D>(
    directory: UserDirectory,
    ids: Vec<u64>,
    mut on_error: D,
) -> impl Stream<Item = UserRecord>
where
    D: FnMut(u64, &PatternError),
{
    stream! {
        for id in ids {
            match directory.fetch_user(id).await {
                Ok(user) => {
                    yield user;
                }
                Err(e) => {
                    tracing::warn!(user_id = id, "Skipping user: {}", e);
                    on_error(id, &e);
                }
            }
        }
    }
}

/// [`stream_users`] with diagnostics reported only through `tracing`
pub fn stream_users_logged(
    directory: UserDirectory,
    ids: Vec<u64>,
) -> impl Stream<Item = UserRecord> {
    stream_users(directory, ids, |_, _| {})
}
