//! Background lease renewal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::engine::update_node;
use crate::error::LockResult;
use crate::report::LockState;
use crate::store::Store;

/// Default cadence at which the renewal loop re-asserts ownership.
///
/// Kept well below any sane TTL so that a missed tick does not cost the lock.
pub const RENEW_INTERVAL: Duration = Duration::from_millis(500);

/// A long-lived task that keeps an acquired lock alive.
///
/// Started by [`LockClient::lock`](crate::client::LockClient::lock); owned by
/// that call and stopped through its quit signal.
pub(crate) struct RenewalLoop<S> {
    pub(crate) store: Arc<S>,
    pub(crate) name: String,
    pub(crate) value: String,
    pub(crate) interval: Duration,
}

impl<S: Store> RenewalLoop<S> {
    /// Runs the renewal loop until the quit signal fires.
    ///
    /// The outcome of the first acquire round-trip is reported through
    /// `first` exactly once. If that attempt did not acquire, the loop exits;
    /// there is nothing to renew and the caller already has the failure.
    ///
    /// Once acquired, every tick re-invokes the acquire/refresh primitive on
    /// the store. Each tick must reach the coordination service: merely
    /// re-examining cached state would let the lease lapse silently.
    /// Ownership-state transitions are forwarded to `owned` when provided.
    ///
    /// On quit the loop stops renewing and lets the lock expire naturally via
    /// its TTL; a dropped quit sender counts as quit.
    pub(crate) async fn run(
        self,
        first: oneshot::Sender<LockResult<LockState>>,
        owned: Option<mpsc::Sender<bool>>,
        mut quit: watch::Receiver<bool>,
    ) {
        let initial = update_node(self.store.as_ref(), &self.name, &self.value).await;
        let mut last_state = *initial.as_ref().unwrap_or(&LockState::Unknown);
        let _ = first.send(initial);
        if last_state != LockState::Acquired {
            return;
        }
        debug!(lock.name = %self.name, "lock acquired, renewal loop started");

        let start = tokio::time::Instant::now() + self.interval;
        let mut tick = tokio::time::interval_at(start, self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = quit.changed() => {
                    match changed {
                        Ok(()) if !*quit.borrow() => continue,
                        _ => {
                            debug!(lock.name = %self.name, "renewal loop stopping on quit signal");
                            return;
                        }
                    }
                }
                _ = tick.tick() => {
                    let state = match update_node(self.store.as_ref(), &self.name, &self.value).await {
                        Ok(state) => state,
                        Err(e) => {
                            warn!(lock.name = %self.name, error = %e, "lock refresh failed");
                            LockState::Unknown
                        }
                    };
                    if state != last_state {
                        debug!(lock.name = %self.name, ?state, "lock ownership changed");
                        if let Some(owned) = &owned {
                            // A departed listener doesn't stop renewal.
                            let _ = owned.send(state == LockState::Acquired).await;
                        }
                        last_state = state;
                    }
                }
            }
        }
    }
}
