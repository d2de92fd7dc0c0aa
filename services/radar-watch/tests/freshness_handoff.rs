
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use harness::{bucket, s3_url, MemoryDirectory, RecordingSink};
use radar_object_keys::SourceId;
use radar_watch::{
    run_render_loop, DirectoryError, FreshnessPoller, KeyResolver, LatestReferenceCell,
    PollOutcome, ResolutionError,
};
use tokio::sync::watch;

fn station() -> SourceId {
    SourceId::parse("kokx").unwrap()
}

#[tokio::test]
async fn end_to_end_listings() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();

    let directory = MemoryDirectory::new(&["2024/05/01/KOKX/file_000", "2024/05/01/KOKX/file_001"]);
    let resolver = KeyResolver::new(Arc::clone(&directory), bucket());
    let reference = resolver.resolve_latest(&station(), now).await.unwrap();
    assert_eq!(reference.to_string(), s3_url("2024/05/01/KOKX/file_001"));

    directory.publish(&["2024/05/01/KOKX/file_000_MDM"]);
    let err = resolver.resolve_latest(&station(), now).await.unwrap_err();
    assert!(matches!(err, ResolutionError::NoValidFile { key_count: 1, .. }));

    directory.publish(&["2024/05/01/KOKX/file_000_MDM", "2024/05/01/KOKX/file_001"]);
    let reference = resolver.resolve_latest(&station(), now).await.unwrap();
    assert_eq!(reference.to_string(), s3_url("2024/05/01/KOKX/file_001"));

    assert!(directory
        .prefixes
        .lock()
        .unwrap()
        .iter()
        .all(|p| p == "2024/05/01/KOKX/"));
}

#[tokio::test]
async fn prefix_recomputed_across_midnight() {
    let directory = MemoryDirectory::new(&[]);
    let resolver = KeyResolver::new(Arc::clone(&directory), bucket());
    let late = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap();

    let _ = resolver.resolve_latest(&station(), late).await;
    let _ = resolver
        .resolve_latest(&station(), late + chrono::Duration::minutes(5))
        .await;

    assert_eq!(
        *directory.prefixes.lock().unwrap(),
        vec!["2024/05/01/KOKX/".to_string(), "2024/05/02/KOKX/".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn poller_and_renderer_run_independently() {
    let directory = MemoryDirectory::new(&[]);
    let cell = Arc::new(LatestReferenceCell::new());
    let sink = Arc::new(RecordingSink::default());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller = FreshnessPoller::new(
        KeyResolver::new(Arc::clone(&directory), bucket()),
        station(),
        Arc::clone(&cell),
        Duration::from_secs(300),
    );
    let poller_handle = tokio::spawn(poller.run(shutdown_rx.clone()));
    let render_handle = tokio::spawn(run_render_loop(
        Arc::clone(&cell),
        Arc::clone(&sink),
        Duration::from_secs(3),
        shutdown_rx,
    ));

    // First poll happens immediately and finds nothing.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(directory.call_count(), 1);
    assert!(cell.is_empty());

    // Data appears but is not seen until the next poll.
    directory.publish(&["2024/05/01/KOKX/file_000"]);
    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(directory.call_count(), 1);
    assert!(sink.frames().is_empty());

    tokio::time::sleep(Duration::from_secs(100)).await;
    assert_eq!(directory.call_count(), 2);
    assert_eq!(
        cell.get().unwrap().to_string(),
        s3_url("2024/05/01/KOKX/file_000")
    );

    // The renderer keeps redrawing the last good reference through an outage.
    directory.fail_with(Some(DirectoryError::Timeout {
        prefix: "2024/05/01/KOKX/".to_string(),
        elapsed: Duration::from_secs(30),
    }));
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(directory.call_count(), 4);

    let frames = sink.frames();
    assert!(frames.len() > 100);
    assert!(frames.iter().all(|f| f == &s3_url("2024/05/01/KOKX/file_000")));

    shutdown_tx.send(true).unwrap();
    poller_handle.await.unwrap();
    render_handle.await.unwrap();
}

#[tokio::test]
async fn unchanged_listing_does_not_republish() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
    let directory = MemoryDirectory::new(&["2024/05/01/KOKX/file_000"]);
    let cell = Arc::new(LatestReferenceCell::new());
    let mut poller = FreshnessPoller::new(
        KeyResolver::new(Arc::clone(&directory), bucket()),
        station(),
        Arc::clone(&cell),
        Duration::from_secs(300),
    );

    let first = poller.poll_once(now).await;
    let held = cell.get().unwrap();
    let second = poller.poll_once(now).await;

    assert!(matches!(first, PollOutcome::Updated { .. }));
    assert!(matches!(second, PollOutcome::Unchanged { .. }));
    assert!(Arc::ptr_eq(&held, &cell.get().unwrap()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_torn_values() {
    let cell = Arc::new(LatestReferenceCell::new());
    let before = s3_url("2024/05/01/KOKX/KOKX20240501_000412_V06");
    let after = s3_url("2024/05/01/KOKX/KOKX20240501_235959_V06");

    let directory = MemoryDirectory::new(&["2024/05/01/KOKX/KOKX20240501_000412_V06"]);
    let mut poller = FreshnessPoller::new(
        KeyResolver::new(Arc::clone(&directory), bucket()),
        station(),
        Arc::clone(&cell),
        Duration::from_secs(300),
    );
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 59).unwrap();
    poller.poll_once(now).await;

    let readers: Vec<_> = (0..16)
        .map(|_| {
            let cell = Arc::clone(&cell);
            let (before, after) = (before.clone(), after.clone());
            tokio::spawn(async move {
                for i in 0..5_000 {
                    let seen = cell.get().map(|r| r.to_string());
                    assert!(
                        seen.as_deref() == Some(before.as_str())
                            || seen.as_deref() == Some(after.as_str())
                    );
                    if i % 100 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        })
        .collect();

    directory.publish(&[
        "2024/05/01/KOKX/KOKX20240501_000412_V06",
        "2024/05/01/KOKX/KOKX20240501_235959_V06",
    ]);
    poller.poll_once(now).await;

    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(cell.get().unwrap().to_string(), after);
}
