//! etcd-backed [`Store`](locker_core::Store) implementations.
//!
//! Two interchangeable strategies, selected at construction:
//!
//! - [`EtcdCasStore`] layers acquire-or-refresh on a value-compare
//!   transaction, for deployments that want the compare and the write to be
//!   a single atomic step.
//! - [`EtcdLeaseStore`] reads the current holder and then binds the value to
//!   a fresh lease, the plain etcd v3 idiom.
//!
//! Both push expiry onto etcd leases: an unrenewed lock disappears on its own
//! once the TTL lapses.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use locker_core::DEFAULT_VALUE;
//! use tokio::sync::watch;
//!
//! # async fn example() -> locker_core::LockResult<()> {
//! let client = locker_etcd::connect(
//!     ["http://127.0.0.1:2379"],
//!     Duration::from_secs(5),
//!     5,
//! )
//! .await?;
//!
//! let (quit_tx, quit_rx) = watch::channel(false);
//! let report = client.lock("my-service", DEFAULT_VALUE, None, quit_rx).await;
//! if report.is_success() {
//!     client.unlock("my-service", &quit_tx).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod cas;
mod lease;
mod tracker;

pub use cas::EtcdCasStore;
pub use lease::EtcdLeaseStore;

use std::time::Duration;

use etcd_client::{Client, ConnectOptions};
use locker_core::{LockClient, LockError, LockResult};

/// Default lock TTL, in seconds.
pub const DEFAULT_TTL: i64 = 5;

/// Default namespace prefix under which lock keys are stored.
pub const DEFAULT_NAMESPACE: &str = "locker";

/// Connection and lock configuration for the etcd stores.
#[derive(Debug, Clone)]
pub struct EtcdOptions {
    endpoints: Vec<String>,
    dial_timeout: Option<Duration>,
    namespace: String,
    ttl: i64,
}

impl EtcdOptions {
    /// Creates options pointing at the given etcd endpoints.
    pub fn new(endpoints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            endpoints: endpoints.into_iter().map(Into::into).collect(),
            dial_timeout: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Sets the dial timeout for the initial connection.
    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = Some(timeout);
        self
    }

    /// Sets the namespace prefix. Lock keys become `<namespace>/<name>`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the lock time-to-live in seconds. Values below 1 fall back to
    /// [`DEFAULT_TTL`].
    pub fn ttl(mut self, ttl: i64) -> Self {
        self.ttl = if ttl > 0 { ttl } else { DEFAULT_TTL };
        self
    }

    pub(crate) fn lock_key(&self, name: &str) -> String {
        format!("{}/{}", self.namespace, name)
    }

    pub(crate) fn ttl_secs(&self) -> i64 {
        self.ttl
    }

    /// Key for the namespace marker. Lives in its own segment so it can
    /// never collide with a lock key, whatever the lock is named.
    pub(crate) fn marker_key(&self) -> String {
        format!("{}/.init", self.namespace)
    }

    pub(crate) async fn connect_client(&self) -> LockResult<Client> {
        let mut options = ConnectOptions::new();
        if let Some(timeout) = self.dial_timeout {
            options = options.with_connect_timeout(timeout);
        }
        Client::connect(&self.endpoints, Some(options))
            .await
            .map_err(|e| LockError::Connection(Box::new(e)))
    }
}

/// Wraps an etcd transport failure as a backend error.
pub(crate) fn backend(e: etcd_client::Error) -> LockError {
    LockError::Backend(Box::new(e))
}

/// Connects to etcd and returns a lock client over the lease-based store.
pub async fn connect(
    endpoints: impl IntoIterator<Item = impl Into<String>>,
    dial_timeout: Duration,
    ttl: i64,
) -> LockResult<LockClient<EtcdLeaseStore>> {
    let options = EtcdOptions::new(endpoints)
        .dial_timeout(dial_timeout)
        .ttl(ttl);
    Ok(LockClient::new(EtcdLeaseStore::connect(options).await?))
}

/// Connects to etcd and returns a lock client over the CAS-emulation store.
pub async fn connect_cas(
    endpoints: impl IntoIterator<Item = impl Into<String>>,
    dial_timeout: Duration,
    ttl: i64,
) -> LockResult<LockClient<EtcdCasStore>> {
    let options = EtcdOptions::new(endpoints)
        .dial_timeout(dial_timeout)
        .ttl(ttl);
    Ok(LockClient::new(EtcdCasStore::connect(options).await?))
}
