//! Client facade composing the lock engine, renewal loop, and watch notifier.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::instrument;

use crate::error::{LockError, LockResult};
use crate::renew::{RenewalLoop, RENEW_INTERVAL};
use crate::report::{LockState, Report, ReportMsg};
use crate::store::Store;
use crate::watch::{watch_changes, WATCH_POLL_INTERVAL};

/// Default value claimed by lock holders that don't need a custom payload.
pub const DEFAULT_VALUE: &str = "ok";

/// The main locker type. Use it to manage your locks.
///
/// A client wraps a [`Store`] and exposes the lock operations on top of it.
/// It is cheap to clone; clones share the underlying store.
///
/// # Example
///
/// ```rust,no_run
/// use locker_core::{LockClient, MemoryStore, DEFAULT_VALUE};
/// use tokio::sync::watch;
///
/// # async fn example() {
/// let client = LockClient::new(MemoryStore::new());
///
/// let (quit_tx, quit_rx) = watch::channel(false);
/// let report = client.lock("my-service", DEFAULT_VALUE, None, quit_rx).await;
/// if report.is_success() {
///     // we hold the lock; it is renewed in the background until quit
///     client.unlock("my-service", &quit_tx).await.unwrap();
/// }
/// # }
/// ```
pub struct LockClient<S> {
    store: Arc<S>,
    renew_interval: Duration,
    watch_poll_interval: Duration,
}

impl<S> Clone for LockClient<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            renew_interval: self.renew_interval,
            watch_poll_interval: self.watch_poll_interval,
        }
    }
}

impl<S: Store> LockClient<S> {
    /// Creates a client over the given store with default intervals.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            renew_interval: RENEW_INTERVAL,
            watch_poll_interval: WATCH_POLL_INTERVAL,
        }
    }

    /// Sets the cadence at which held locks are refreshed.
    ///
    /// Must stay well below the store's TTL or the lock will lapse between
    /// refreshes.
    pub fn renew_interval(mut self, interval: Duration) -> Self {
        self.renew_interval = interval;
        self
    }

    /// Sets the sampling interval used by [`watch`](Self::watch).
    pub fn watch_poll_interval(mut self, interval: Duration) -> Self {
        self.watch_poll_interval = interval;
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the value of a lock.
    ///
    /// [`LockError::NotFound`] is returned if no lock with this name is held.
    #[instrument(skip(self), fields(lock.name = %name))]
    pub async fn get(&self, name: &str) -> LockResult<String> {
        self.store.get(name).await
    }

    /// Reports whether a lock is currently available to us.
    ///
    /// A held, non-empty value reports `Failure`; an absent or empty value
    /// reports `Success`. Infrastructure errors report `Failure` with the
    /// error populated so an outage is never mistaken for an open lock.
    #[instrument(skip(self), fields(lock.name = %name))]
    pub async fn inspect(&self, name: &str) -> Report {
        match self.store.get(name).await {
            Ok(v) if !v.is_empty() => Report::failure(None),
            Ok(_) | Err(LockError::NotFound(_)) => Report::success(),
            Err(e) => Report::failure(Some(e)),
        }
    }

    /// Creates a lock for `name` and sets its value.
    ///
    /// If `owned` is provided, a `bool` is pushed whenever our ownership of
    /// the lock changes (`true` = acquired). Sending `true` on the quit
    /// channel stops the background refresh and lets the lock expire via its
    /// TTL if we own it.
    ///
    /// Returns once the first acquire round-trip to the coordination service
    /// has completed, success or failure; later renewals happen in the
    /// background. A lock observed as held is reported as `Failure` without
    /// attempting acquisition.
    #[instrument(skip(self, owned, quit), fields(lock.name = %name, lock.value = %value))]
    pub async fn lock(
        &self,
        name: &str,
        value: &str,
        owned: Option<mpsc::Sender<bool>>,
        quit: watch::Receiver<bool>,
    ) -> Report {
        let report = self.inspect(name).await;
        if report.msg == ReportMsg::Failure {
            return report;
        }

        let (first_tx, first_rx) = oneshot::channel();
        let renewal = RenewalLoop {
            store: self.store.clone(),
            name: name.to_string(),
            value: value.to_string(),
            interval: self.renew_interval,
        };
        tokio::spawn(renewal.run(first_tx, owned, quit));

        match first_rx.await {
            Ok(Ok(LockState::Acquired)) => Report::success(),
            // The pre-check raced: someone claimed the lock between inspect
            // and acquire. Contention is not an error, so `err` stays empty.
            Ok(Ok(_)) => Report::failure(None),
            Ok(Err(e)) => Report::failure(Some(e)),
            Err(_) => unreachable!("renewal loop exited without reporting its first attempt"),
        }
    }

    /// Stops renewing a lock and deletes its entry.
    ///
    /// Both steps are required: stopping renewal alone leaves the key alive
    /// until its last-set TTL lapses, and deleting without stopping renewal
    /// races a refresh that could resurrect the key. The quit send is
    /// best-effort because the renewal loop may have exited already.
    #[instrument(skip(self, quit), fields(lock.name = %name))]
    pub async fn unlock(&self, name: &str, quit: &watch::Sender<bool>) -> LockResult<()> {
        let _ = quit.send(true);
        self.store.delete(name).await
    }

    /// Watches a lock's value, emitting on `changes` whenever it differs from
    /// the previous observation (absent reads as the empty string).
    ///
    /// Blocks until the quit signal fires or the receiver of `changes` is
    /// dropped; run it in its own task.
    #[instrument(skip(self, changes, quit), fields(lock.name = %name))]
    pub async fn watch(
        &self,
        name: &str,
        changes: mpsc::Sender<String>,
        quit: watch::Receiver<bool>,
    ) {
        watch_changes(
            self.store.clone(),
            name,
            changes,
            quit,
            self.watch_poll_interval,
        )
        .await
    }
}
