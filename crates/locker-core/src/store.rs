//! Core store trait for lock persistence.

use std::future::Future;
use std::sync::Arc;

use crate::error::LockResult;

/// A persistence mechanism for locks.
///
/// A store is a thin adapter over a strongly consistent key-value
/// coordination service. It needs to support point reads, an atomic
/// acquire-or-refresh, and deletion; mutual exclusion itself is enforced by
/// the atomicity the coordination service provides, never by this layer.
///
/// # Example
///
/// ```rust,ignore
/// use locker_core::{LockClient, MemoryStore};
///
/// let client = LockClient::new(MemoryStore::new());
/// ```
pub trait Store: Send + Sync + 'static {
    /// Returns the value of a lock.
    ///
    /// Absence is normalized across backends: every implementation returns
    /// [`LockError::NotFound`](crate::LockError::NotFound) when no entry
    /// exists, including backends whose native read reports absence as an
    /// empty value with no error.
    fn get(&self, name: &str) -> impl Future<Output = LockResult<String>> + Send;

    /// Acquires a named lock if it isn't already held, or refreshes its TTL
    /// if it is held with `value`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - the lock is now held by `value` with a fresh TTL
    /// * `Err(LockError::Denied)` - a conflicting value is stored; another
    ///   holder is active
    /// * `Err(...)` - an infrastructure failure, propagated verbatim
    fn acquire_or_refresh(
        &self,
        name: &str,
        value: &str,
    ) -> impl Future<Output = LockResult<()>> + Send;

    /// Removes the lock entry immediately, independent of its TTL.
    ///
    /// Deleting a lock that doesn't exist is not an error.
    fn delete(&self, name: &str) -> impl Future<Output = LockResult<()>> + Send;
}

impl<S: Store> Store for Arc<S> {
    fn get(&self, name: &str) -> impl Future<Output = LockResult<String>> + Send {
        self.as_ref().get(name)
    }

    fn acquire_or_refresh(
        &self,
        name: &str,
        value: &str,
    ) -> impl Future<Output = LockResult<()>> + Send {
        self.as_ref().acquire_or_refresh(name, value)
    }

    fn delete(&self, name: &str) -> impl Future<Output = LockResult<()>> + Send {
        self.as_ref().delete(name)
    }
}
