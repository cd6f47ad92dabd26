//! Resource stores.
//!
//! Each store owns one server-backed collection. Views read snapshots through
//! accessor methods; every mutation goes through a store operation.

pub mod drafts;
pub mod editable;
pub mod inbox;
pub mod prompts;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle of a store's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Never fetched.
    #[default]
    Idle,
    /// At least one request is in flight.
    Loading,
    /// The last settled fetch succeeded.
    Ready,
    /// The last settled request failed; the previous data is still shown.
    Failed,
}

impl Status {
    pub(crate) const fn resolve(loading: bool, failed: bool, loaded: bool) -> Self {
        if loading {
            Self::Loading
        } else if failed {
            Self::Failed
        } else if loaded {
            Self::Ready
        } else {
            Self::Idle
        }
    }
}

/// Locks store state, recovering it if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Orders overlapping fetches of one collection.
///
/// Every fetch takes a ticket when issued. A successful response replaces the
/// collection only if no later-issued fetch has already been applied, and
/// the error flag follows the latest-issued fetch that has settled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tickets {
    issued: u64,
    applied: u64,
    settled: u64,
}

/// What a settling fetch may update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settle {
    /// Replace the collection with this response's payload.
    pub data: bool,
    /// Overwrite the error flag with this response's outcome.
    pub outcome: bool,
}

impl Tickets {
    pub(crate) const fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub(crate) const fn settle(&mut self, ticket: u64, ok: bool) -> Settle {
        let data = ok && ticket > self.applied;
        if data {
            self.applied = ticket;
        }
        let outcome = ticket > self.settled;
        if outcome {
            self.settled = ticket;
        }
        Settle { data, outcome }
    }

    pub(crate) const fn has_applied(&self) -> bool {
        self.applied > 0
    }
}
