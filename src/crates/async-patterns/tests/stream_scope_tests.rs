//! Integration tests for the streaming producer and resource scopes

use async_patterns::async_utils::scope::{acquire_resource, release_resource};
use async_patterns::{
    operation_with_cleanup, stream_users, PatternError, PatternsConfig, ResourceScope,
    ScopePhase, UserDirectory,
};
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_stream_yields_two_records_and_one_diagnostic() {
    let directory = UserDirectory::default();
    let mut diagnostics = Vec::new();

    let ids: Vec<u64> = stream_users(directory, vec![1, 999, 2], |id, _| diagnostics.push(id))
        .map(|user| user.id)
        .collect()
        .await;

    assert_eq!(ids, vec![1, 2]);
    assert_eq!(diagnostics, vec![999]);
}

#[tokio::test(start_paused = true)]
async fn test_stream_consumer_can_stop_early() {
    let directory = UserDirectory::default();

    let users = stream_users(directory.clone(), vec![999, 2, 1, 1], |_, _| {});
    futures::pin_mut!(users);

    let first = users.next().await.unwrap();
    assert_eq!(first.id, 2);
    drop(users);

    // 999 and 2 were looked up; the trailing ids never were
    assert_eq!(directory.lookups(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_scoped_cleanup_observed_exactly_once() {
    let latency = Duration::from_millis(10);

    for should_fail in [false, true] {
        let releases = AtomicUsize::new(0);
        let mut scope = ResourceScope::new("counted");

        let result = scope
            .run(
                || acquire_resource("counted", latency),
                |resource| async move {
                    if should_fail {
                        Err(PatternError::InvalidOperation(format!("{} rejected", resource)))
                    } else {
                        Ok(resource.id().to_string())
                    }
                },
                |resource| {
                    let releases = &releases;
                    async move {
                        release_resource(&resource, latency).await?;
                        releases.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                },
            )
            .await;

        assert_eq!(result.is_err(), should_fail);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(scope.phase(), ScopePhase::Done);
    }
}

#[tokio::test(start_paused = true)]
async fn test_operation_with_cleanup_surfaces_main_error() {
    let config = PatternsConfig::default();

    let ok = operation_with_cleanup(&config, false).await;
    assert!(ok.is_ok());

    let err = operation_with_cleanup(&config, true).await.unwrap_err();
    assert!(err.to_string().contains("failed"));
    assert!(matches!(err, PatternError::InvalidOperation(_)));
}
