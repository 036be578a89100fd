//! Convenience prelude for locker types.

pub use crate::client::{LockClient, DEFAULT_VALUE};
pub use crate::error::{LockError, LockResult};
pub use crate::memory::MemoryStore;
pub use crate::report::{LockState, Report, ReportMsg};
pub use crate::store::Store;
