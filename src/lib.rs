//! Distributed locks over etcd with TTL renewal and change notification.
//!
//! Independent processes coordinate exclusive ownership of named resources
//! through a strongly consistent key-value coordination service, used purely
//! as a linearizable ledger. Acquisition rides on the service's atomic
//! acquire-or-refresh primitive, a background task keeps the TTL fresh while
//! the holder is healthy, and expiry releases the lock automatically when the
//! holder dies.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use locker::DEFAULT_VALUE;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> locker::LockResult<()> {
//!     let client = locker::connect(
//!         ["http://127.0.0.1:2379"],
//!         Duration::from_secs(5),
//!         5,
//!     )
//!     .await?;
//!
//!     let (quit_tx, quit_rx) = watch::channel(false);
//!     let report = client.lock("my-service", DEFAULT_VALUE, None, quit_rx).await;
//!     if report.is_success() {
//!         // critical section; the lock is refreshed in the background
//!         client.unlock("my-service", &quit_tx).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Crate organization
//!
//! This is a meta-crate that re-exports:
//! - `locker-core`: the [`Store`] trait, the lock engine, [`LockClient`],
//!   and the in-memory store
//! - `locker-etcd`: etcd-backed stores (CAS-emulation and lease strategies)
//!
//! For fine-grained control, depend on the individual crates instead.

pub use locker_core::*;
pub use locker_etcd::*;
