//! Core traits and the lock engine for distributed locks over a
//! coordination service.
//!
//! A [`LockClient`] coordinates exclusive ownership of named resources
//! across processes, using a strongly consistent key-value store (the
//! [`Store`] trait) purely as a linearizable ledger: acquisition rides on the
//! store's atomic acquire-or-refresh primitive, a background task keeps the
//! TTL fresh while the holder is healthy, and expiry releases the lock
//! automatically when the holder dies.
//!
//! This crate is backend-agnostic. The `locker-etcd` crate provides stores
//! backed by etcd; [`MemoryStore`] is a self-contained implementation for
//! tests and single-process use.

pub mod client;
pub mod error;
pub mod memory;
pub mod prelude;
pub mod report;
pub mod store;

mod engine;
mod renew;
mod watch;

pub use client::{LockClient, DEFAULT_VALUE};
pub use error::{LockError, LockResult};
pub use memory::MemoryStore;
pub use renew::RENEW_INTERVAL;
pub use report::{LockState, Report, ReportMsg};
pub use store::Store;
pub use watch::WATCH_POLL_INTERVAL;
