//! CAS-emulation store.

use std::sync::atomic::{AtomicBool, Ordering};

use etcd_client::{Client, Compare, CompareOp, PutOptions, Txn, TxnOp, TxnOpResponse};
use locker_core::{LockError, LockResult, Store};
use tracing::debug;

use crate::tracker::LeaseTracker;
use crate::{backend, EtcdOptions};

/// TTL, in seconds, for the protective lease used while force-creating an
/// absent key. Short on purpose: if the follow-up compare loses, the stray
/// key disappears quickly.
const PROTECT_TTL: i64 = 2;

/// Outcome of one compare-and-swap transaction.
enum CasOutcome {
    /// The compare matched and the value was written with a fresh lease.
    Swapped,
    /// The key does not exist yet.
    Missing,
    /// A different value is stored.
    Conflict,
}

/// An etcd-backed [`Store`] that emulates acquire-or-refresh with a
/// compare-and-swap transaction.
///
/// Each acquire/refresh grants a fresh lease for the configured TTL and
/// writes the value bound to it inside a transaction whose guard is "the
/// stored value equals ours". When the guard fails because the key is absent,
/// the key is force-created under a short protective lease and the
/// transaction is retried exactly once. The window between the force-set and
/// the retry is a narrow, accepted race inherited from the protocol; losing
/// it surfaces as [`LockError::Denied`].
pub struct EtcdCasStore {
    client: Client,
    options: EtcdOptions,
    namespace_ready: AtomicBool,
    leases: LeaseTracker,
}

impl EtcdCasStore {
    /// Connects to etcd and builds the store.
    pub async fn connect(options: EtcdOptions) -> LockResult<Self> {
        let client = options.connect_client().await?;
        Ok(Self {
            client,
            options,
            namespace_ready: AtomicBool::new(false),
            leases: LeaseTracker::default(),
        })
    }

    /// Creates the namespace marker key if it is absent.
    ///
    /// etcd can end up with nothing under the prefix once every lock has
    /// expired; an existing marker makes the transaction's guard fail, which
    /// is the "already exists" success case.
    async fn ensure_namespace(&self) -> LockResult<()> {
        if self.namespace_ready.load(Ordering::Acquire) {
            return Ok(());
        }

        let marker = self.options.marker_key();
        let txn = Txn::new()
            .when(vec![Compare::create_revision(
                marker.as_str(),
                CompareOp::Equal,
                0,
            )])
            .and_then(vec![TxnOp::put(marker.as_str(), "", None)]);
        let mut client = self.client.clone();
        client.txn(txn).await.map_err(backend)?;

        self.namespace_ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn grant_lease(&self, ttl: i64) -> LockResult<i64> {
        let mut client = self.client.clone();
        let lease = client.lease_grant(ttl, None).await.map_err(backend)?;
        Ok(lease.id())
    }

    /// Runs one compare-and-swap round: guard on the stored value equalling
    /// `value`, write bound to a fresh lease on success, read the key in the
    /// else branch to tell "missing" from "conflicting".
    async fn try_cas(&self, key: &str, value: &str) -> LockResult<CasOutcome> {
        let lease = self.grant_lease(self.options.ttl_secs()).await?;
        let txn = Txn::new()
            .when(vec![Compare::value(key, CompareOp::Equal, value)])
            .and_then(vec![TxnOp::put(
                key,
                value,
                Some(PutOptions::new().with_lease(lease)),
            )])
            .or_else(vec![TxnOp::get(key, None)]);

        let mut client = self.client.clone();
        let resp = client.txn(txn).await.map_err(backend)?;

        if resp.succeeded() {
            if let Some(old) = self.leases.swap(key, lease) {
                // The key is bound to the new lease now; revoking the old one
                // is cleanup only, so a failure here is not fatal.
                let _ = client.lease_revoke(old).await;
            }
            return Ok(CasOutcome::Swapped);
        }

        // Compare failed; the lease granted for the write is unused.
        let _ = client.lease_revoke(lease).await;

        match resp.op_responses().into_iter().next() {
            Some(TxnOpResponse::Get(get)) if get.kvs().is_empty() => Ok(CasOutcome::Missing),
            Some(TxnOpResponse::Get(_)) => Ok(CasOutcome::Conflict),
            _ => unreachable!("txn else branch always carries the read"),
        }
    }

    /// Force-creates the key under a short protective lease so the follow-up
    /// compare has something to match. Not atomic with the retry.
    async fn force_set(&self, key: &str, value: &str) -> LockResult<()> {
        debug!(lock.key = key, "key absent, force-setting before CAS retry");
        let lease = self.grant_lease(PROTECT_TTL).await?;
        let mut client = self.client.clone();
        client
            .put(key, value, Some(PutOptions::new().with_lease(lease)))
            .await
            .map_err(backend)?;
        Ok(())
    }
}

impl Store for EtcdCasStore {
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
        self.ensure_namespace().await?;
        let key = self.options.lock_key(name);

        match self.try_cas(&key, value).await? {
            CasOutcome::Swapped => return Ok(()),
            CasOutcome::Conflict => return Err(LockError::Denied(name.to_string())),
            CasOutcome::Missing => {}
        }

        // Retry at most once after force-creating the key. A second miss
        // means another acquirer won the window.
        self.force_set(&key, value).await?;
        match self.try_cas(&key, value).await? {
            CasOutcome::Swapped => Ok(()),
            _ => Err(LockError::Denied(name.to_string())),
        }
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
