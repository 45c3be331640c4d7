//! Batch lookups over a sequence of identifiers
//!
//! Both aggregators turn per-item failures into data: a failed lookup is
//! reported as its error description at that position, so the output always
//! has one entry per input identifier, in input order.

use crate::logging::timed;
use crate::users::{format_user, UserDirectory};
use futures::future::join_all;

async fn describe(directory: &UserDirectory, id: u64) -> String {
    match directory.fetch_user(id).await {
        Ok(user) => format_user(&user),
        Err(e) => e.to_string(),
    }
}

/// Look up each identifier in turn
///
/// Lookup N does not start until lookup N-1 has been captured, so the total
/// latency is the sum of the per-item latencies.
pub async fn fetch_users_sequential(directory: &UserDirectory, ids: &[u64]) -> Vec<String> {
    timed("fetch_users_sequential", async {
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            outcomes.push(describe(directory, id).await);
        }
        outcomes
    })
    .await
}

/// Look up every identifier concurrently
///
/// All lookups start together and the call waits for every one to settle.
/// Total latency is that of the slowest item.
pub async fn fetch_users_parallel(directory: &UserDirectory, ids: &[u64]) -> Vec<String> {
    let lookups = ids.iter().map(|&id| describe(directory, id));
    timed("fetch_users_parallel", join_all(lookups)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_sequential_captures_failures_in_place() {
        let directory = UserDirectory::default();

        let outcomes = fetch_users_sequential(&directory, &[1, 999, 2]).await;

        assert_eq!(
            outcomes,
            vec![
                "John Doe (john@example.com)".to_string(),
                "User 999 not found".to_string(),
                "Jane Smith (jane@example.com)".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_preserves_input_order() {
        let directory = UserDirectory::default();

        let outcomes = fetch_users_parallel(&directory, &[2, 7, 1]).await;

        assert_eq!(outcomes[0], "Jane Smith (jane@example.com)");
        assert_eq!(outcomes[1], "User 7 not found");
        assert_eq!(outcomes[2], "John Doe (john@example.com)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input() {
        let directory = UserDirectory::default();

        assert!(fetch_users_sequential(&directory, &[]).await.is_empty());
        assert!(fetch_users_parallel(&directory, &[]).await.is_empty());
        assert_eq!(directory.lookups(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_is_faster_than_sequential() {
        let directory = UserDirectory::new(Duration::from_millis(100));
        let ids = [1, 2, 3, 4];

        let start = Instant::now();
        let sequential = fetch_users_sequential(&directory, &ids).await;
        let sequential_elapsed = start.elapsed();

        let start = Instant::now();
        let parallel = fetch_users_parallel(&directory, &ids).await;
        let parallel_elapsed = start.elapsed();

        assert_eq!(sequential, parallel);
        assert!(sequential_elapsed >= Duration::from_millis(400));
        assert!(parallel_elapsed >= Duration::from_millis(100));
        assert!(parallel_elapsed < Duration::from_millis(200));
    }
}
