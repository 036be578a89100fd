//! The acquisition state machine.

use tracing::debug;

use crate::error::{LockError, LockResult};
use crate::report::LockState;
use crate::store::Store;

/// Re-asserts ownership of `name` with `value` against the store,
/// effectively updating the TTL of the entry and ensuring our value is still
/// in it.
///
/// Contention maps to `Ok(Released)` - losing a lock to another holder is an
/// expected outcome, not a system fault. Any other store error is propagated
/// verbatim, leaving the caller's view of ownership `Unknown`.
pub(crate) async fn update_node<S: Store>(
    store: &S,
    name: &str,
    value: &str,
) -> LockResult<LockState> {
    match store.acquire_or_refresh(name, value).await {
        Ok(()) => Ok(LockState::Acquired),
        Err(LockError::Denied(_)) => {
            debug!(lock.name = name, "acquire denied by conflicting holder");
            Ok(LockState::Released)
        }
        // no idea what just happened, surface it to the caller
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Mode {
        Acquire,
        Deny,
        Fail,
    }

    struct StubStore(Mode);

    impl Store for StubStore {
        async fn get(&self, name: &str) -> LockResult<String> {
            Err(LockError::NotFound(name.to_string()))
        }

        async fn acquire_or_refresh(&self, name: &str, _value: &str) -> LockResult<()> {
            match self.0 {
                Mode::Acquire => Ok(()),
                Mode::Deny => Err(LockError::Denied(name.to_string())),
                Mode::Fail => Err(LockError::Backend(Box::new(std::io::Error::other(
                    "etcd unavailable",
                )))),
            }
        }

        async fn delete(&self, _name: &str) -> LockResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn successful_acquire_maps_to_acquired() {
        let state = update_node(&StubStore(Mode::Acquire), "svc", "ok")
            .await
            .unwrap();
        assert_eq!(state, LockState::Acquired);
    }

    #[tokio::test]
    async fn denied_acquire_maps_to_released_without_error() {
        let state = update_node(&StubStore(Mode::Deny), "svc", "ok")
            .await
            .unwrap();
        assert_eq!(state, LockState::Released);
    }

    #[tokio::test]
    async fn infrastructure_errors_are_propagated_verbatim() {
        let err = update_node(&StubStore(Mode::Fail), "svc", "ok")
            .await
            .unwrap_err();
        assert!(matches!(err, LockError::Backend(_)));
    }
}
