//! Lease-based store.

use etcd_client::{Client, PutOptions};
use locker_core::{LockError, LockResult, Store};
use tracing::debug;

use crate::tracker::LeaseTracker;
use crate::{backend, EtcdOptions};

/// An etcd-backed [`Store`] using native leases.
///
/// Acquire/refresh reads the current holder, denies on a conflicting value,
/// then grants a lease for the configured TTL and puts the value bound to it.
/// The compare and the put are separate round-trips, so this store is
/// non-racy for a single acquirer but does not itself make contended creation
/// atomic; use [`EtcdCasStore`](crate::EtcdCasStore) where that matters.
///
/// etcd's native read reports an absent key as an empty response rather than
/// an error; [`Store::get`] normalizes that to
/// [`LockError::NotFound`].
pub struct EtcdLeaseStore {
    client: Client,
    options: EtcdOptions,
    leases: LeaseTracker,
}

impl EtcdLeaseStore {
    /// Connects to etcd and builds the store.
    pub async fn connect(options: EtcdOptions) -> LockResult<Self> {
        let client = options.connect_client().await?;
        Ok(Self {
            client,
            options,
            leases: LeaseTracker::default(),
        })
    }
}

impl Store for EtcdLeaseStore {
    async fn get(&self, name: &str) -> LockResult<String> {
        let key = self.options.lock_key(name);
        let mut client = self.client.clone();
        let resp = client.get(key.as_str(), None).await.map_err(backend)?;
        match resp.kvs().first() {
            Some(kv) => Ok(kv.value_str().map_err(backend)?.to_string()),
            None => Err(LockError::NotFound(name.to_string())),
        }
    }

    async fn acquire_or_refresh(&self, name: &str, value: &str) -> LockResult<()> {
        let key = self.options.lock_key(name);
        let mut client = self.client.clone();

        // Exclusivity is layered on the read: a conflicting stored value
        // denies before any lease is granted.
        let resp = client.get(key.as_str(), None).await.map_err(backend)?;
        if let Some(kv) = resp.kvs().first() {
            let current = kv.value_str().map_err(backend)?;
            if !current.is_empty() && current != value {
                return Err(LockError::Denied(name.to_string()));
            }
        }

        let lease = client
            .lease_grant(self.options.ttl_secs(), None)
            .await
            .map_err(backend)?
            .id();
        client
            .put(
                key.as_str(),
                value,
                Some(PutOptions::new().with_lease(lease)),
            )
            .await
            .map_err(backend)?;
        debug!(lock.key = %key, lease, "value bound to fresh lease");

        if let Some(old) = self.leases.swap(&key, lease) {
            // The key now rides on the new lease; the old one is just noise.
            let _ = client.lease_revoke(old).await;
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> LockResult<()> {
        let key = self.options.lock_key(name);
        let mut client = self.client.clone();
        client.delete(key.as_str(), None).await.map_err(backend)?;
        if let Some(lease) = self.leases.take(&key) {
            let _ = client.lease_revoke(lease).await;
        }
        Ok(())
    }
}
