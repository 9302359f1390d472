//! Change-version counters.
//!
//! A [`Revision`] is the polled counterpart of a [`Signal`](crate::Signal):
//! a model bumps it every time it notifies, and a consumer that would rather
//! not register callbacks remembers the last value it saw and compares.
//!
//! ```
//! use tabula_core::Revision;
//!
//! let revision = Revision::new();
//! let seen = revision.get();
//! revision.bump();
//! assert!(revision.changed_since(seen));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing change counter.
#[derive(Debug, Default)]
pub struct Revision {
    value: AtomicU64,
}

impl Revision {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value.
    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Advances the counter and returns the new value.
    pub fn bump(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns `true` if the counter moved past `seen`.
    #[inline]
    pub fn changed_since(&self, seen: u64) -> bool {
        self.get() != seen
    }
}
