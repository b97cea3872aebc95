//! Integration tests for the cooperative scan timer.

use chrome_info_exporter::ScanTimer;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn test_job_runs_repeatedly() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let timer = ScanTimer::arm(Duration::from_millis(10), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    timer.cancel().await;

    assert!(runs.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_runs_never_overlap() {
    let active = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let runs = Arc::new(AtomicUsize::new(0));

    let (a, o, r) = (Arc::clone(&active), Arc::clone(&overlaps), Arc::clone(&runs));
    let timer = ScanTimer::arm(Duration::from_millis(1), move || {
        if a.swap(true, Ordering::SeqCst) {
            o.fetch_add(1, Ordering::SeqCst);
        }
        std::thread::sleep(Duration::from_millis(15));
        r.fetch_add(1, Ordering::SeqCst);
        a.store(false, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    timer.cancel().await;

    assert!(runs.load(Ordering::SeqCst) >= 1);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rearm_happens_after_run() {
    let timer = ScanTimer::arm(Duration::from_millis(20), move || {
        std::thread::sleep(Duration::from_millis(30));
    });
    let first = timer.next_deadline();

    tokio::time::sleep(Duration::from_millis(150)).await;
    let next = timer.next_deadline();
    // The next deadline is one interval after the slow run finished
    assert!(next >= first + Duration::from_millis(50));
    timer.cancel().await;
}

#[tokio::test]
async fn test_no_runs_after_cancel() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let timer = ScanTimer::arm(Duration::from_millis(5), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(30)).await;
    timer.cancel().await;
    let after_cancel = runs.load(Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(runs.load(Ordering::SeqCst), after_cancel);
}

#[tokio::test]
async fn test_first_deadline_is_one_interval_out() {
    let before = Instant::now();
    let timer = ScanTimer::arm(Duration::from_secs(3), || {});
    let deadline = timer.next_deadline();
    assert!(deadline >= before + Duration::from_secs(3));
    timer.cancel().await;
}
