//! Integration tests against a live etcd cluster.
//!
//! Run with `cargo test -- --ignored` and `ETCD_ENDPOINTS` pointing at your
//! cluster (defaults to `http://127.0.0.1:2379`).

use std::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use locker::{LockError, ReportMsg, DEFAULT_VALUE};
use tokio::sync::watch;

/// Makes `tracing` output visible when debugging against a live cluster.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().compact().try_init();
}

/// Helper to get etcd endpoints from the environment or use the default.
fn endpoints() -> Vec<String> {
    std::env::var("ETCD_ENDPOINTS")
        .unwrap_or_else(|_| "http://127.0.0.1:2379".to_string())
        .split(',')
        .map(str::to_string)
        .collect()
}

/// Fresh key per test so runs don't interfere.
fn random_key() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("locker-test-{nanos}")
}

#[tokio::test]
#[ignore] // Requires etcd running
async fn lease_store_lock_roundtrip() {
    init_tracing();
    let client = locker::connect(endpoints(), Duration::from_secs(5), 5)
        .await
        .unwrap();
    let key = random_key();

    let (quit_tx, quit_rx) = watch::channel(false);
    let report = client.lock(&key, DEFAULT_VALUE, None, quit_rx).await;
    assert!(report.is_success(), "first lock should succeed: {report:?}");
    assert_eq!(client.get(&key).await.unwrap(), DEFAULT_VALUE);

    client.unlock(&key, &quit_tx).await.unwrap();
    assert!(matches!(client.get(&key).await, Err(LockError::NotFound(_))));
}

#[tokio::test]
#[ignore] // Requires etcd running
async fn cas_store_denies_a_conflicting_holder() {
    init_tracing();
    let holder = locker::connect_cas(endpoints(), Duration::from_secs(5), 5)
        .await
        .unwrap();
    let contender = locker::connect_cas(endpoints(), Duration::from_secs(5), 5)
        .await
        .unwrap();
    let key = random_key();

    let (quit_tx, quit_rx) = watch::channel(false);
    assert!(holder.lock(&key, "holder", None, quit_rx).await.is_success());

    let (_quit_tx2, quit_rx2) = watch::channel(false);
    let report = contender.lock(&key, "contender", None, quit_rx2).await;
    assert_eq!(report.msg, ReportMsg::Failure);
    assert_eq!(holder.get(&key).await.unwrap(), "holder");

    holder.unlock(&key, &quit_tx).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires etcd running
async fn cas_store_race_on_a_fresh_key_yields_one_winner() {
    init_tracing();
    let key = random_key();

    let mut attempts = Vec::new();
    for value in ["holder-a", "holder-b"] {
        let endpoints = endpoints();
        let key = key.clone();
        attempts.push(tokio::spawn(async move {
            let client = locker::connect_cas(endpoints, Duration::from_secs(5), 5)
                .await
                .unwrap();
            let (quit_tx, quit_rx) = watch::channel(false);
            let report = client.lock(&key, value, None, quit_rx).await;
            (report, quit_tx)
        }));
    }

    // both contenders enter the force-set/retry window on an absent key;
    // the compare decides, and it must crown exactly one of them
    let mut successes = 0;
    for attempt in attempts {
        let (report, _quit_tx) = attempt.await.unwrap();
        if report.is_success() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one acquirer may win the race");
}

#[tokio::test]
#[ignore] // Requires etcd running
async fn cas_store_lock_expires_without_renewal() {
    init_tracing();
    let client = locker::connect_cas(endpoints(), Duration::from_secs(5), 2)
        .await
        .unwrap();
    let key = random_key();

    let (quit_tx, quit_rx) = watch::channel(false);
    assert!(client.lock(&key, "ours", None, quit_rx).await.is_success());

    // stop renewing and wait out the lease TTL
    quit_tx.send(true).unwrap();
    tokio::time::sleep(Duration::from_secs(4)).await;

    let (quit_tx, quit_rx) = watch::channel(false);
    let report = client.lock(&key, "theirs", None, quit_rx).await;
    assert!(report.is_success(), "expired lock should be reacquirable");
    client.unlock(&key, &quit_tx).await.unwrap();
}
