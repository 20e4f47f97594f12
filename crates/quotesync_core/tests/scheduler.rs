mod common;

use common::{book_with, reconciler_for, MockRemote};
use quotesync_core::{Quote, SyncScheduler};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(10);

#[tokio::test(start_paused = true)]
async fn scheduler_syncs_immediately_and_repeatedly_until_stopped() {
    let remote = MockRemote::with_records(vec![Quote::from_remote(99, "server")]);
    let (_, book) = book_with(vec![Quote::new(1, "local", "X")]);
    let reconciler = reconciler_for(remote.clone(), book);

    let handle = SyncScheduler::start(reconciler.clone(), TICK);
    // Ticks land at 0, 10, 20 and 30 ms.
    tokio::time::sleep(Duration::from_millis(35)).await;
    assert!(handle.is_running());

    let stats = handle.stop().await.unwrap();

    assert_eq!(stats.cycles, 4);
    assert_eq!(stats.succeeded, 4);
    assert_eq!(stats.failed, 0);
    assert_eq!(remote.fetch_calls(), 4);

    tokio::time::sleep(TICK * 5).await;
    assert_eq!(remote.fetch_calls(), 4);

    let book = reconciler.book();
    let book = book.lock().await;
    assert_eq!(book.len(), 2);
    assert!(book.quotes().iter().all(|quote| quote.synced));
}

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_before_the_first_interval_elapses() {
    let remote = MockRemote::with_records(Vec::new());
    let (_, book) = book_with(Vec::new());
    let reconciler = reconciler_for(remote.clone(), book);

    let handle = SyncScheduler::start(reconciler, Duration::from_secs(30));
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(remote.fetch_calls(), 1);
    assert_eq!(handle.stop().await.unwrap().cycles, 1);
}

#[tokio::test(start_paused = true)]
async fn scheduler_keeps_running_through_fetch_failures() {
    let remote = MockRemote::with_records(Vec::new());
    remote.set_fail_fetch(true);
    let (_, book) = book_with(vec![Quote::new(1, "local", "X")]);
    let reconciler = reconciler_for(remote.clone(), book);

    let handle = SyncScheduler::start(reconciler.clone(), TICK);
    tokio::time::sleep(Duration::from_millis(25)).await;
    let stats = handle.stop().await.unwrap();

    assert_eq!(stats.cycles, 3);
    assert_eq!(stats.failed, 3);
    assert_eq!(stats.succeeded, 0);
    assert!(!reconciler.book().lock().await.get(1).unwrap().synced);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_task() {
    let remote = MockRemote::with_records(Vec::new());
    let (_, book) = book_with(Vec::new());
    let reconciler = reconciler_for(remote.clone(), book);

    let handle = SyncScheduler::start(reconciler, TICK);
    tokio::time::sleep(Duration::from_millis(25)).await;
    drop(handle);
    tokio::task::yield_now().await;

    let calls = remote.fetch_calls();
    tokio::time::sleep(TICK * 5).await;
    assert_eq!(remote.fetch_calls(), calls);
}
