//! Integration tests for the lookup, aggregators and callback bridge

use async_patterns::{
    fetch_users_parallel, fetch_users_sequential, PatternError, PatternsConfig, UserDirectory,
};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_only_ids_one_and_two_resolve() {
    let directory = UserDirectory::default();

    for id in 0..20u64 {
        let result = directory.fetch_user(id).await;
        match id {
            1 | 2 => assert_eq!(result.unwrap().id, id),
            _ => assert_eq!(result, Err(PatternError::NotFound(id))),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_aggregators_agree_per_position() {
    let directory = UserDirectory::default();
    let ids = [2, 1, 404, 2, 0];

    let sequential = fetch_users_sequential(&directory, &ids).await;
    let parallel = fetch_users_parallel(&directory, &ids).await;

    assert_eq!(sequential.len(), ids.len());
    assert_eq!(sequential, parallel);
    assert_eq!(parallel[2], "User 404 not found");
    assert_eq!(parallel[4], "User 0 not found");
}

#[tokio::test(start_paused = true)]
async fn test_parallel_latency_is_the_slowest_item() {
    let config = PatternsConfig::default().with_lookup_latency(Duration::from_millis(100));
    let directory = UserDirectory::from_config(&config);

    let start = Instant::now();
    fetch_users_sequential(&directory, &[1, 2]).await;
    let sequential = start.elapsed();

    let start = Instant::now();
    fetch_users_parallel(&directory, &[1, 2]).await;
    let parallel = start.elapsed();

    assert!(sequential >= Duration::from_millis(200));
    assert!(parallel < sequential);
    assert!(parallel < Duration::from_millis(150));
}

#[tokio::test(start_paused = true)]
async fn test_callback_and_future_forms_agree() {
    let directory = UserDirectory::default();

    let ok = directory.fetch_user_via_callback(1).await.unwrap();
    assert_eq!(ok, directory.fetch_user(1).await.unwrap());

    let err = directory.fetch_user_via_callback(12).await.unwrap_err();
    assert_eq!(err, PatternError::NotFound(12));
}
