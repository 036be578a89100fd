//! Value-change notification.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::warn;

use crate::error::LockError;
use crate::store::Store;

/// Default sampling interval for
/// [`LockClient::watch`](crate::client::LockClient::watch).
pub const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Samples a lock's value and emits it on `changes` whenever it differs from
/// the previous emission.
///
/// An absent lock reads as the empty string, so the first sample of a
/// never-locked name emits `""` and consecutive identical reads emit nothing.
/// Read failures other than not-found skip the sample; the next tick retries.
/// Terminates on the quit signal or when the receiving side of `changes` is
/// dropped.
pub(crate) async fn watch_changes<S: Store>(
    store: Arc<S>,
    name: &str,
    changes: mpsc::Sender<String>,
    mut quit: watch::Receiver<bool>,
    poll: Duration,
) {
    let mut last: Option<String> = None;
    loop {
        let current = match store.get(name).await {
            Ok(value) => Some(value),
            Err(LockError::NotFound(_)) => Some(String::new()),
            Err(e) => {
                warn!(lock.name = name, error = %e, "watch sample failed");
                None
            }
        };

        if let Some(current) = current {
            if last.as_deref() != Some(current.as_str()) {
                if changes.send(current.clone()).await.is_err() {
                    return;
                }
                last = Some(current);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(poll) => {}
            _ = changes.closed() => return,
            changed = quit.changed() => {
                match changed {
                    Ok(()) if !*quit.borrow() => continue,
                    _ => return,
                }
            }
        }
    }
}
