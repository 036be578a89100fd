//! Ownership states and lock-attempt outcomes.

use crate::error::LockError;

/// Ownership state derived from the most recent acquire/refresh round-trip.
///
/// Every call re-derives the state; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Initial state, or an infrastructure error left ownership undetermined.
    Unknown,
    /// The last acquire/refresh against the coordination service succeeded
    /// with our value.
    Acquired,
    /// A conflicting holder was observed, or the lock was explicitly
    /// released.
    Released,
}

/// Message half of a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMsg {
    /// The lock attempt (or inspection) found the lock available to us.
    Success,
    /// The lock is held by someone else, or the attempt failed outright.
    Failure,
}

/// Outcome of a single [`LockClient::lock`](crate::client::LockClient::lock)
/// attempt. Produced fresh per call, never persisted.
#[derive(Debug)]
pub struct Report {
    /// Success or failure of the attempt.
    pub msg: ReportMsg,
    /// The underlying error, when the failure was not plain contention.
    pub err: Option<LockError>,
}

impl Report {
    pub(crate) fn success() -> Self {
        Self {
            msg: ReportMsg::Success,
            err: None,
        }
    }

    pub(crate) fn failure(err: Option<LockError>) -> Self {
        Self {
            msg: ReportMsg::Failure,
            err,
        }
    }

    /// Returns `true` if the attempt succeeded.
    pub fn is_success(&self) -> bool {
        self.msg == ReportMsg::Success
    }
}
