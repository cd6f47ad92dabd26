//! Busy and loading flags with scoped release.
//!
//! Both flags are released by dropping their guard, so an early return, an
//! error or a dropped future can never leave a flag stuck.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A flag that at most one holder owns at a time.
///
/// Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    /// Creates a released flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the flag, or returns `None` if someone already holds it.
    #[must_use]
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    /// Whether a guard is currently alive.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases its [`BusyFlag`] on drop.
#[derive(Debug)]
#[must_use = "the flag is released as soon as the guard is dropped"]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Counts overlapping activities on one store.
///
/// The store reports loading while any [`ActivityGuard`] is alive, so nested
/// or concurrent activities never flicker the indicator off early.
#[derive(Debug, Clone, Default)]
pub struct Activity(Arc<AtomicUsize>);

impl Activity {
    /// Creates an idle counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of an activity until the guard drops.
    pub fn begin(&self) -> ActivityGuard {
        self.0.fetch_add(1, Ordering::AcqRel);
        ActivityGuard(Arc::clone(&self.0))
    }

    /// Whether any activity is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.count() > 0
    }

    /// Number of activities in progress.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// Ends one activity on drop.
#[derive(Debug)]
#[must_use = "the activity ends as soon as the guard is dropped"]
pub struct ActivityGuard(Arc<AtomicUsize>);

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
