//! Change notification for table models.
//!
//! Consumers learn about changes in one of two ways:
//!
//! - connect to the [`Signal`]s in [`ModelSignals`], or
//! - poll [`ModelSignals::revision`], which advances on every notification.
//!
//! Refresh requests can additionally be batched: with deferral enabled, modes
//! are OR-ed together and delivered once by [`ModelSignals::flush_refresh`].

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tabula_core::logging::targets;
use tabula_core::{Revision, Signal};

/// What a consumer should refresh. A bit set; combine with `|`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RefreshMode(u32);

impl RefreshMode {
    /// Nothing to refresh.
    pub const NONE: Self = Self(0);
    /// Sources or column layout changed.
    pub const STRUCTURE: Self = Self(0x01);
    /// Header text changed.
    pub const HEADER: Self = Self(0x02);
    /// Row count changed.
    pub const ROWS: Self = Self(0x04);
    /// Cell values changed.
    pub const VALUES: Self = Self(0x08);
    /// Row order changed.
    pub const SORT: Self = Self(0x10);
    /// Everything.
    pub const ALL: Self = Self(0x1F);

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if no bit is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for RefreshMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RefreshMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(RefreshMode, &str); 5] = [
            (RefreshMode::STRUCTURE, "STRUCTURE"),
            (RefreshMode::HEADER, "HEADER"),
            (RefreshMode::ROWS, "ROWS"),
            (RefreshMode::VALUES, "VALUES"),
            (RefreshMode::SORT, "SORT"),
        ];
        if self.is_empty() {
            return f.write_str("RefreshMode(NONE)");
        }
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(mode, _)| self.contains(*mode))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "RefreshMode({})", names.join(" | "))
    }
}

/// Collection of signals emitted by table models.
///
/// # Signal Usage
///
/// - **Structure changes** (sources, strides, visibility, row-number column):
///   `structure_changed`
/// - **Cell writes**: `data_changed` with `(sorted_row, logical_column)`
/// - **Sorting**: `layout_changed` with the sorted column (`None` after a reset)
/// - **Refresh requests**: `refresh_requested`, possibly batched
pub struct ModelSignals {
    /// Emitted after the set of columns or rows changed shape.
    pub structure_changed: Signal<()>,

    /// Emitted after a cell was written.
    /// Args: (sorted row, logical column)
    pub data_changed: Signal<(usize, usize)>,

    /// Emitted after the row order changed.
    /// Args: sorted column, or `None` when unsorted
    pub layout_changed: Signal<Option<usize>>,

    /// Emitted when the consumer should refresh.
    pub refresh_requested: Signal<RefreshMode>,

    revision: Revision,
    defer_refresh: AtomicBool,
    pending_refresh: Mutex<RefreshMode>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSignals")
            .field("revision", &self.revision.get())
            .field("defer_refresh", &self.is_refresh_deferred())
            .field("pending_refresh", &*self.pending_refresh.lock())
            .finish_non_exhaustive()
    }
}

impl ModelSignals {
    /// Creates a new set of model signals.
    pub fn new() -> Self {
        Self {
            structure_changed: Signal::new(),
            data_changed: Signal::new(),
            layout_changed: Signal::new(),
            refresh_requested: Signal::new(),
            revision: Revision::new(),
            defer_refresh: AtomicBool::new(false),
            pending_refresh: Mutex::new(RefreshMode::NONE),
        }
    }

    /// Current change version. Advances on every notification.
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    // -------------------------------------------------------------------------
    // Convenience methods for emitting signals
    // -------------------------------------------------------------------------

    /// Emits `structure_changed` and requests a structural refresh.
    pub fn emit_structure_changed(&self) {
        self.revision.bump();
        self.structure_changed.emit(());
        self.request_refresh(RefreshMode::STRUCTURE | RefreshMode::HEADER | RefreshMode::ROWS);
    }

    /// Emits `data_changed` for a single cell and requests a value refresh.
    pub fn emit_data_changed(&self, sorted_row: usize, column: usize) {
        self.revision.bump();
        self.data_changed.emit((sorted_row, column));
        self.request_refresh(RefreshMode::VALUES);
    }

    /// Bumps the revision and requests a header refresh. Header text has no
    /// signal of its own.
    pub fn emit_header_changed(&self) {
        self.revision.bump();
        self.request_refresh(RefreshMode::HEADER);
    }

    /// Emits `layout_changed` and requests a sort refresh.
    pub fn emit_layout_changed(&self, sorted_column: Option<usize>) {
        self.revision.bump();
        self.layout_changed.emit(sorted_column);
        self.request_refresh(RefreshMode::SORT);
    }

    // -------------------------------------------------------------------------
    // Refresh batching
    // -------------------------------------------------------------------------

    /// Returns whether refresh requests are being accumulated.
    pub fn is_refresh_deferred(&self) -> bool {
        self.defer_refresh.load(Ordering::SeqCst)
    }

    /// Enables or disables refresh batching.
    ///
    /// Disabling does not flush; call [`flush_refresh`](Self::flush_refresh)
    /// to deliver anything still pending.
    pub fn set_refresh_deferred(&self, deferred: bool) {
        self.defer_refresh.store(deferred, Ordering::SeqCst);
    }

    /// Requests a refresh: emitted now, or accumulated while deferred.
    pub fn request_refresh(&self, mode: RefreshMode) {
        if mode.is_empty() {
            return;
        }
        if self.is_refresh_deferred() {
            let mut pending = self.pending_refresh.lock();
            *pending |= mode;
            tracing::trace!(target: targets::REFRESH, ?mode, pending = ?*pending, "refresh deferred");
            return;
        }
        self.refresh_requested.emit(mode);
    }

    /// Returns the accumulated refresh mode without delivering it.
    pub fn pending_refresh(&self) -> RefreshMode {
        *self.pending_refresh.lock()
    }

    /// Delivers accumulated refresh requests as a single emission.
    ///
    /// Returns the delivered mode, or `None` if nothing was pending.
    pub fn flush_refresh(&self) -> Option<RefreshMode> {
        let mode = std::mem::take(&mut *self.pending_refresh.lock());
        if mode.is_empty() {
            return None;
        }
        tracing::debug!(target: targets::REFRESH, ?mode, "flushing refresh");
        self.refresh_requested.emit(mode);
        Some(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_refresh_mode_bits() {
        let mode = RefreshMode::STRUCTURE | RefreshMode::VALUES;
        assert!(mode.contains(RefreshMode::STRUCTURE));
        assert!(mode.contains(RefreshMode::VALUES));
        assert!(!mode.contains(RefreshMode::SORT));
        assert!(RefreshMode::ALL.contains(mode));
        assert!(RefreshMode::default().is_empty());
        assert_eq!(format!("{mode:?}"), "RefreshMode(STRUCTURE | VALUES)");
    }

    #[test]
    fn test_model_signals_creation() {
        let signals = ModelSignals::new();
        assert_eq!(signals.structure_changed.connection_count(), 0);
        assert_eq!(signals.data_changed.connection_count(), 0);
        assert_eq!(signals.revision(), 0);
    }

    #[test]
    fn test_every_emission_bumps_revision() {
        let signals = ModelSignals::new();
        signals.emit_structure_changed();
        signals.emit_data_changed(0, 0);
        signals.emit_layout_changed(Some(1));
        signals.emit_header_changed();
        assert_eq!(signals.revision(), 4);
    }

    #[test]
    fn test_immediate_refresh() {
        let signals = ModelSignals::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let recv = received.clone();
        signals.refresh_requested.connect(move |mode| recv.lock().push(*mode));

        signals.emit_data_changed(2, 3);
        assert_eq!(*received.lock(), vec![RefreshMode::VALUES]);
        assert_eq!(signals.flush_refresh(), None);
    }

    #[test]
    fn test_deferred_refresh_coalesces() {
        let signals = ModelSignals::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let recv = received.clone();
        signals.refresh_requested.connect(move |mode| recv.lock().push(*mode));

        signals.set_refresh_deferred(true);
        signals.emit_data_changed(0, 0);
        signals.emit_data_changed(1, 0);
        signals.emit_layout_changed(Some(0));
        assert!(received.lock().is_empty());
        assert_eq!(
            signals.pending_refresh(),
            RefreshMode::VALUES | RefreshMode::SORT
        );

        let flushed = signals.flush_refresh();
        assert_eq!(flushed, Some(RefreshMode::VALUES | RefreshMode::SORT));
        assert_eq!(*received.lock(), vec![RefreshMode::VALUES | RefreshMode::SORT]);
        assert!(signals.pending_refresh().is_empty());
    }
}
