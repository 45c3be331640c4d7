//! First-settlement races
//!
//! The first operation to settle decides the outcome, whether it succeeded
//! or failed. The losers are dropped at that point: any side effect they had
//! already performed stays, anything after their next suspension point never
//! happens.

use crate::{PatternError, Result};
use futures::future::select_all;
use std::future::Future;

/// Return the settlement of whichever of two operations settles first
///
/// Ties (both ready on the same poll) go to `first`.
///
/// ```rust,ignore
/// let fastest = race(primary.fetch_user(1), replica.fetch_user(1)).await?;
/// ```
pub async fn race<A, B, T, E>(first: A, second: B) -> std::result::Result<T, E>
where
    A: Future<Output = std::result::Result<T, E>>,
    B: Future<Output = std::result::Result<T, E>>,
{
    tokio::select! {
        biased;
        result = first => {
            tracing::debug!("First operation settled first");
            result
        }
        result = second => {
            tracing::debug!("Second operation settled first");
            result
        }
    }
}

/// Race any number of operations, returning the winner's settlement and index
///
/// Fails with [`PatternError::InvalidOperation`] when given no operations.
/// A failing winner's error is returned unchanged.
pub async fn race_all<I, F, T>(operations: I) -> Result<(T, usize)>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    let pinned: Vec<_> = operations.into_iter().map(Box::pin).collect();
    if pinned.is_empty() {
        return Err(PatternError::InvalidOperation(
            "race_all needs at least one operation".to_string(),
        ));
    }

    let contenders = pinned.len();
    let (settled, index, _losers) = select_all(pinned).await;
    tracing::debug!("Operation {} of {} settled first", index, contenders);

    settled.map(|value| (value, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::UserDirectory;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    async fn after(ms: u64, outcome: Result<&'static str>) -> Result<&'static str> {
        sleep(Duration::from_millis(ms)).await;
        outcome
    }

    #[tokio::test(start_paused = true)]
    async fn test_faster_success_wins() {
        let result = race(after(100, Ok("slow")), after(20, Ok("fast"))).await;
        assert_eq!(result, Ok("fast"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_faster_failure_beats_slower_success() {
        let result = race(
            after(100, Ok("slow")),
            after(10, Err(PatternError::InvalidOperation("fast failure".into()))),
        )
        .await;

        assert_eq!(
            result,
            Err(PatternError::InvalidOperation("fast failure".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slower_failure_is_discarded() {
        let result = race(
            after(10, Ok("fast")),
            after(50, Err(PatternError::NotFound(1))),
        )
        .await;

        assert_eq!(result, Ok("fast"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tie_goes_to_first() {
        let result = race(after(30, Ok("first")), after(30, Ok("second"))).await;
        assert_eq!(result, Ok("first"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loser_is_dropped() {
        let loser_finished = AtomicBool::new(false);

        let result = race(after(10, Ok("winner")), async {
            sleep(Duration::from_millis(100)).await;
            loser_finished.store(true, Ordering::SeqCst);
            Ok("loser")
        })
        .await;

        sleep(Duration::from_millis(200)).await;
        assert_eq!(result, Ok("winner"));
        assert!(!loser_finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_against_lookup() {
        let directory = UserDirectory::new(Duration::from_millis(100));

        let result = race(directory.fetch_user(1), async {
            sleep(Duration::from_millis(50)).await;
            Err(PatternError::Timeout(Duration::from_millis(50)))
        })
        .await;

        assert_eq!(result, Err(PatternError::Timeout(Duration::from_millis(50))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_all_reports_winner_index() {
        let result = race_all(vec![
            after(90, Ok("a")),
            after(30, Ok("b")),
            after(60, Ok("c")),
        ])
        .await;

        assert_eq!(result, Ok(("b", 1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_all_failure_wins() {
        let result = race_all(vec![
            after(90, Ok("a")),
            after(5, Err(PatternError::NotFound(8))),
        ])
        .await;
        assert_eq!(result, Err(PatternError::NotFound(8)));
    }

    #[tokio::test]
    async fn test_race_all_empty() {
        let result = race_all(Vec::<std::future::Ready<Result<()>>>::new()).await;
        assert!(matches!(result, Err(PatternError::InvalidOperation(_))));
    }
}
