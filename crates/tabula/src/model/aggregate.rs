//! The aggregated table model.
//!
//! `AggregateTableModel` presents several independent [`TableSource`]s as a
//! single logical table. Each source keeps its own column visibility and row
//! stride; an optional row-number column can lead the table; and rows can be
//! reordered through a sort projection that never touches the sources.
//!
//! # Index spaces
//!
//! - **Sorted row**: what consumers iterate. Every public row argument is a
//!   sorted row, except [`AggregateTableModel::sorted_row_of`].
//! - **Real row**: the row before sorting. Real row `r` of a binding with
//!   stride `s` is source row `r * s`.
//! - **Logical column**: spans the row-number column (if shown) followed by
//!   the visible columns of every binding, in registration order.
//!
//! Row and column counts are recomputed on every query, so they are never
//! stale with respect to the sources.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tabula::model::{
//!     AggregateTableModel, CellValue, ColumnClass, GridColumn, GridSource, TableSource,
//! };
//!
//! let positions: Arc<dyn TableSource> = Arc::new(GridSource::from_column(
//!     GridColumn::new("x", ColumnClass::Real),
//!     vec![Some(0.5.into()), Some(2.0.into()), None],
//! ));
//!
//! let model = AggregateTableModel::new();
//! model.add_source(positions.clone());
//! model.set_row_number_visible(true);
//!
//! assert_eq!(model.column_count(), 2);
//! assert_eq!(model.column_name(1), "x");
//!
//! model.sort_by(1);
//! assert_eq!(model.value(0, 1), Some(CellValue::Float(2.0)));
//! assert_eq!(model.value(2, 1), None);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tabula_core::logging::targets;

use super::binding::{BindingTable, ResolvedColumn};
use super::row_number::{RowNumberOverlay, validate_header};
use super::signals::ModelSignals;
use super::sort::{SortProjection, sort_mixed, sort_numeric};
use super::source::TableSource;
use super::value::{CellValue, ColumnClass};
use crate::config::TableConfig;
use crate::error::{Error, Result};

/// Name reported for a logical column that does not exist.
pub const UNKNOWN_COLUMN_NAME: &str = "unknown";

/// A cell target after resolution: which source, and where in it.
struct CellTarget {
    source: Arc<dyn TableSource>,
    row: usize,
    column: usize,
}

/// A table model combining several data sources into one logical table.
///
/// All methods take `&self`; state lives behind `parking_lot` locks so the
/// model can be shared through an `Arc`. It is meant to be driven from a
/// single logical thread and provides no ordering guarantees between
/// concurrent writers.
///
/// Locks are released before a cell is read from or written to a source and
/// before any signal is emitted, so slots may freely query the model.
pub struct AggregateTableModel {
    bindings: RwLock<BindingTable>,
    row_numbers: RwLock<RowNumberOverlay>,
    projection: RwLock<SortProjection>,
    signals: ModelSignals,
}

impl Default for AggregateTableModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateTableModel {
    /// Creates an empty model with no sources and no row-number column.
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(BindingTable::new()),
            row_numbers: RwLock::new(RowNumberOverlay::new()),
            projection: RwLock::new(SortProjection::new()),
            signals: ModelSignals::new(),
        }
    }

    /// Creates an empty model from a validated configuration.
    pub fn with_config(config: TableConfig) -> Result<Self> {
        config.validate()?;
        let model = Self::new();
        {
            let mut overlay = model.row_numbers.write();
            overlay.set_visible(config.row_number_visible);
            overlay.set_header(config.row_number_header);
        }
        model.signals.set_refresh_deferred(config.defer_refresh);
        Ok(model)
    }

    /// Returns the model's signals.
    pub fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    /// Current change version; advances on every notification.
    pub fn revision(&self) -> u64 {
        self.signals.revision()
    }

    // -------------------------------------------------------------------------
    // Source registration
    // -------------------------------------------------------------------------

    /// Appends a source with stride 1 and every column visible.
    ///
    /// Adding the same source twice creates two independent bindings.
    pub fn add_source(&self, source: Arc<dyn TableSource>) {
        self.bindings.write().add(source);
        self.structure_changed();
    }

    /// Removes the first binding of `source`.
    ///
    /// Returns [`Error::UnknownSource`] if the source is not bound.
    pub fn remove_source(&self, source: &Arc<dyn TableSource>) -> Result<()> {
        self.bindings.write().remove(source)?;
        self.structure_changed();
        Ok(())
    }

    /// Removes every source.
    pub fn clear(&self) {
        self.bindings.write().clear();
        self.structure_changed();
    }

    /// Sets the row stride of `source`: only every `stride`-th row is shown.
    pub fn set_stride(&self, source: &Arc<dyn TableSource>, stride: usize) -> Result<()> {
        self.bindings.write().find_mut(source)?.set_stride(stride)?;
        self.structure_changed();
        Ok(())
    }

    /// Returns the row stride of `source`.
    pub fn stride(&self, source: &Arc<dyn TableSource>) -> Result<usize> {
        Ok(self.bindings.read().find(source)?.stride())
    }

    /// Shows or hides a column of `source`.
    pub fn set_column_visible(
        &self,
        source: &Arc<dyn TableSource>,
        column: usize,
        visible: bool,
    ) -> Result<()> {
        let changed = self
            .bindings
            .write()
            .find_mut(source)?
            .set_column_visible(column, visible);
        if changed {
            self.structure_changed();
        }
        Ok(())
    }

    /// Returns whether a column of `source` is visible.
    pub fn is_column_visible(&self, source: &Arc<dyn TableSource>, column: usize) -> Result<bool> {
        Ok(self.bindings.read().find(source)?.is_column_visible(column))
    }

    /// Number of bindings.
    pub fn source_count(&self) -> usize {
        self.bindings.read().len()
    }

    /// Bound sources in registration order.
    pub fn sources(&self) -> Vec<Arc<dyn TableSource>> {
        self.bindings
            .read()
            .iter()
            .map(|b| b.source().clone())
            .collect()
    }

    // -------------------------------------------------------------------------
    // Row-number column
    // -------------------------------------------------------------------------

    /// Shows or hides the leading row-number column.
    pub fn set_row_number_visible(&self, visible: bool) {
        let changed = self.row_numbers.write().set_visible(visible);
        if changed {
            self.structure_changed();
        }
    }

    /// Returns whether the row-number column is shown.
    pub fn is_row_number_visible(&self) -> bool {
        self.row_numbers.read().is_visible()
    }

    /// Sets the header text of the row-number column.
    ///
    /// Returns [`Error::EmptyHeader`] for blank text, leaving the header as
    /// it was.
    pub fn set_row_number_header(&self, header: impl Into<String>) -> Result<()> {
        let header = header.into();
        validate_header(&header)?;
        self.row_numbers.write().set_header(header);
        self.signals.emit_header_changed();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Shape
    // -------------------------------------------------------------------------

    /// Number of logical rows: the largest `ceil(rows / stride)` over all
    /// bindings, or 0 when there are none.
    pub fn row_count(&self) -> usize {
        self.snapshot().row_count()
    }

    /// Number of logical columns: the row-number column (if shown) plus the
    /// visible columns of every binding.
    pub fn column_count(&self) -> usize {
        let data_columns = self.snapshot().column_count();
        self.row_numbers.read().width() + data_columns
    }

    /// Copy of the bindings, so sources are queried with no lock held.
    fn snapshot(&self) -> BindingTable {
        self.bindings.read().clone()
    }

    /// Resolves a logical column to the row-number column or a source column.
    ///
    /// Returns [`Error::ColumnOutOfRange`] for a column past the end.
    pub fn resolve_column(&self, column: usize) -> Result<ResolvedColumn> {
        let overlay = self.row_numbers.read().clone();
        let Some(data_column) = overlay.data_column(column) else {
            return Ok(ResolvedColumn::RowNumber);
        };
        let bindings = self.snapshot();
        bindings
            .resolve(data_column)
            .map_err(|_| Error::ColumnOutOfRange {
                column,
                column_count: overlay.width() + bindings.column_count(),
            })
    }

    /// Header text of a logical column.
    ///
    /// Returns [`UNKNOWN_COLUMN_NAME`] for a column that does not exist, so
    /// that a consumer querying mid-update gets a placeholder, not a failure.
    pub fn column_name(&self, column: usize) -> String {
        match self.resolve_column(column) {
            Ok(ResolvedColumn::RowNumber) => self.row_numbers.read().header().to_string(),
            Ok(ResolvedColumn::Source {
                binding,
                source_column,
            }) => match self.binding_source(binding) {
                Some(source) => source.column_name(source_column),
                None => UNKNOWN_COLUMN_NAME.to_string(),
            },
            Err(_) => UNKNOWN_COLUMN_NAME.to_string(),
        }
    }

    /// Declared type of a logical column; [`ColumnClass::Other`] when it
    /// does not exist.
    pub fn column_class(&self, column: usize) -> ColumnClass {
        match self.resolve_column(column) {
            Ok(ResolvedColumn::RowNumber) => RowNumberOverlay::column_class(),
            Ok(ResolvedColumn::Source {
                binding,
                source_column,
            }) => self
                .binding_source(binding)
                .map(|source| source.column_class(source_column))
                .unwrap_or_default(),
            Err(_) => ColumnClass::Other,
        }
    }

    /// Header text of every logical column, in order.
    pub fn column_names(&self) -> Vec<String> {
        (0..self.column_count())
            .map(|column| self.column_name(column))
            .collect()
    }

    fn binding_source(&self, binding: usize) -> Option<Arc<dyn TableSource>> {
        self.bindings
            .read()
            .get(binding)
            .map(|b| b.source().clone())
    }

    // -------------------------------------------------------------------------
    // Cells
    // -------------------------------------------------------------------------

    /// Value shown at `(sorted_row, column)`.
    ///
    /// Returns `None` for an empty cell, a position out of range, or a row
    /// past the end of a shorter or strided source.
    pub fn value(&self, sorted_row: usize, column: usize) -> Option<CellValue> {
        let real_row = self.real_row(sorted_row)?;
        self.read_cell(real_row, column)
    }

    /// Writes `value` at `(sorted_row, column)`.
    ///
    /// Writes to the row-number column, to positions out of range, or to rows
    /// past the end of a shorter or strided source are dropped silently.
    /// Emits `data_changed` when the write reached a source.
    pub fn set_value(&self, value: CellValue, sorted_row: usize, column: usize) {
        let Some(real_row) = self.real_row(sorted_row) else {
            tracing::trace!(target: targets::MODEL, sorted_row, column, "write past last row dropped");
            return;
        };
        if self.write_cell(value, real_row, column) {
            self.signals.emit_data_changed(sorted_row, column);
        }
    }

    /// Returns `true` if the cell at `(sorted_row, column)` accepts writes.
    ///
    /// The row-number column never does.
    pub fn is_cell_editable(&self, sorted_row: usize, column: usize) -> bool {
        self.real_row(sorted_row)
            .and_then(|real_row| self.cell_target(real_row, column))
            .is_some_and(|target| target.source.is_cell_editable(target.row, target.column))
    }

    /// Resolves `(real_row, column)` to a source cell. `None` for the
    /// row-number column and for anything out of range.
    fn cell_target(&self, real_row: usize, column: usize) -> Option<CellTarget> {
        let ResolvedColumn::Source {
            binding,
            source_column,
        } = self.resolve_column(column).ok()?
        else {
            return None;
        };
        let bindings = self.snapshot();
        let binding = bindings.get(binding)?;
        let row = binding.source_row(real_row)?;
        Some(CellTarget {
            source: binding.source().clone(),
            row,
            column: source_column,
        })
    }

    /// Reads a cell in real-row space.
    fn read_cell(&self, real_row: usize, column: usize) -> Option<CellValue> {
        if self.row_numbers.read().is_row_number_column(column) {
            if self.bindings.read().is_empty() {
                return None;
            }
            return Some(RowNumberOverlay::value(real_row));
        }
        let target = self.cell_target(real_row, column)?;
        target.source.value(target.row, target.column)
    }

    /// Writes a cell in real-row space. Returns `true` if a source was called.
    fn write_cell(&self, value: CellValue, real_row: usize, column: usize) -> bool {
        match self.cell_target(real_row, column) {
            Some(target) => {
                target.source.set_value(target.row, target.column, value);
                true
            }
            None => {
                tracing::trace!(target: targets::MODEL, real_row, column, "write outside any source dropped");
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Real row shown at `sorted_row`.
    pub fn real_row(&self, sorted_row: usize) -> Option<usize> {
        let row_count = self.row_count();
        let mut projection = self.projection.write();
        if projection.ensure_len(row_count) {
            tracing::trace!(target: targets::SORT, row_count, "stale projection reallocated");
        }
        projection.real_row(sorted_row)
    }

    /// Sorted position of `real_row`, or `None` if it is out of range.
    pub fn sorted_row_of(&self, real_row: usize) -> Option<usize> {
        let row_count = self.row_count();
        let mut projection = self.projection.write();
        projection.ensure_len(row_count);
        projection.sorted_row_of(real_row)
    }

    /// The column last sorted by, or `None` when unsorted.
    pub fn sorted_column(&self) -> Option<usize> {
        self.projection.read().sorted_column()
    }

    /// Sorts rows by a logical column: descending, empty cells last.
    ///
    /// Sorting is defined over displayed values, so strides, visibility and
    /// the row-number column all apply. A numeric column holding a
    /// non-numeric value leaves the row order unchanged; the failure is
    /// logged and not reported.
    ///
    /// A column out of range is ignored: nothing is recorded or emitted.
    pub fn sort_by(&self, column: usize) {
        if column >= self.column_count() {
            tracing::debug!(target: targets::SORT, column, "sort column out of range, ignored");
            return;
        }

        let row_count = self.row_count();
        {
            let mut projection = self.projection.write();
            projection.mark_sorted(column);
            projection.ensure_len(row_count);
        }

        let read = |real_row| self.read_cell(real_row, column);
        let order = if self.column_class(column).is_numeric() {
            match sort_numeric(row_count, read) {
                Ok(order) => order,
                Err(failure) => {
                    tracing::debug!(target: targets::SORT, column, %failure, "numeric sort aborted");
                    self.signals.emit_layout_changed(Some(column));
                    return;
                }
            }
        } else {
            sort_mixed(row_count, read)
        };

        let applied = {
            let mut projection = self.projection.write();
            projection.ensure_len(self.row_count());
            projection.apply(order)
        };
        if applied {
            tracing::debug!(target: targets::SORT, column, row_count, "rows sorted");
        } else {
            tracing::debug!(target: targets::SORT, column, "row count changed during sort, order discarded");
        }
        self.signals.emit_layout_changed(Some(column));
    }

    /// Sorts by `column` unless it is already the sort column, the way a
    /// header click behaves. Returns `true` if it sorted.
    pub fn sort_on_header_click(&self, column: usize) -> bool {
        if self.sorted_column() == Some(column) || column >= self.column_count() {
            return false;
        }
        self.sort_by(column);
        true
    }

    /// Restores the unsorted order.
    pub fn reset_sort(&self) {
        let row_count = self.row_count();
        self.projection.write().reset(row_count);
        tracing::debug!(target: targets::SORT, row_count, "sort reset");
        self.signals.emit_layout_changed(None);
    }

    // -------------------------------------------------------------------------
    // Notification
    // -------------------------------------------------------------------------

    /// Reallocates the projection for the new shape and notifies.
    fn structure_changed(&self) {
        let row_count = self.row_count();
        self.projection.write().reallocate(row_count);
        tracing::debug!(
            target: targets::MODEL,
            sources = self.source_count(),
            row_count,
            column_count = self.column_count(),
            "structure changed"
        );
        self.signals.emit_structure_changed();
    }
}

impl fmt::Debug for AggregateTableModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateTableModel")
            .field("bindings", &*self.bindings.read())
            .field("row_numbers", &*self.row_numbers.read())
            .field("projection", &*self.projection.read())
            .finish_non_exhaustive()
    }
}

/// An aggregated model is itself a source, in sorted-row space, so models
/// can nest.
impl TableSource for AggregateTableModel {
    fn row_count(&self) -> usize {
        AggregateTableModel::row_count(self)
    }

    fn column_count(&self) -> usize {
        AggregateTableModel::column_count(self)
    }

    fn column_name(&self, column: usize) -> String {
        AggregateTableModel::column_name(self, column)
    }

    fn column_class(&self, column: usize) -> ColumnClass {
        AggregateTableModel::column_class(self, column)
    }

    fn value(&self, row: usize, column: usize) -> Option<CellValue> {
        AggregateTableModel::value(self, row, column)
    }

    fn set_value(&self, row: usize, column: usize, value: CellValue) {
        AggregateTableModel::set_value(self, value, row, column)
    }

    fn is_cell_editable(&self, row: usize, column: usize) -> bool {
        AggregateTableModel::is_cell_editable(self, row, column)
    }
}

static_assertions::assert_impl_all!(AggregateTableModel: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::source::{GridColumn, GridSource};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{OnceLock, Weak};

    fn int_source(rows: usize, cols: usize) -> Arc<dyn TableSource> {
        let columns = (0..cols)
            .map(|c| GridColumn::new(format!("c{c}"), ColumnClass::Integer))
            .collect();
        let data = (0..rows)
            .map(|r| (0..cols).map(|c| Some(((r * 10 + c) as i64).into())).collect())
            .collect();
        Arc::new(GridSource::from_rows(columns, data))
    }

    #[test]
    fn test_empty_model() {
        let model = AggregateTableModel::new();
        assert_eq!(model.row_count(), 0);
        assert_eq!(model.column_count(), 0);
        assert_eq!(model.column_name(0), UNKNOWN_COLUMN_NAME);
        assert_eq!(model.column_class(0), ColumnClass::Other);
        assert_eq!(model.value(0, 0), None);
    }

    #[test]
    fn test_row_number_without_sources_has_no_rows() {
        let model = AggregateTableModel::new();
        model.set_row_number_visible(true);
        assert_eq!(model.column_count(), 1);
        assert_eq!(model.row_count(), 0);
        assert_eq!(model.value(0, 0), None);
        assert_eq!(model.column_name(0), "row");
    }

    #[test]
    fn test_structural_change_reallocates_projection() {
        let model = AggregateTableModel::new();
        let a = int_source(3, 1);
        model.add_source(a.clone());
        model.sort_by(0);
        assert_eq!(model.sorted_row_of(2), Some(0));

        model.add_source(int_source(5, 1));
        // Identity again, but the recorded sort column survives.
        assert_eq!(model.sorted_column(), Some(0));
        for row in 0..5 {
            assert_eq!(model.real_row(row), Some(row));
        }
    }

    #[test]
    fn test_source_growth_is_picked_up_on_access() {
        let grid = Arc::new(GridSource::new(vec![GridColumn::new("v", ColumnClass::Integer)]));
        let model = AggregateTableModel::new();
        model.add_source(grid.clone());
        assert_eq!(model.row_count(), 0);

        grid.push_row(vec![Some(1.into())]);
        grid.push_row(vec![Some(2.into())]);
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.value(1, 0), Some(CellValue::Int(2)));
    }

    #[test]
    fn test_sort_failure_leaves_order() {
        // Declared integer, but holds text.
        let grid: Arc<dyn TableSource> = Arc::new(GridSource::from_column(
            GridColumn::new("n", ColumnClass::Integer),
            vec![Some(1.into()), Some("oops".into()), Some(3.into())],
        ));
        let model = AggregateTableModel::new();
        model.add_source(grid);

        model.sort_by(0);
        assert_eq!(model.sorted_column(), Some(0));
        for row in 0..3 {
            assert_eq!(model.real_row(row), Some(row));
        }
    }

    #[test]
    fn test_sort_out_of_range_column_is_ignored() {
        let model = AggregateTableModel::new();
        model.add_source(int_source(3, 1));
        model.sort_by(0);
        let before = model.revision();

        model.sort_by(9);
        assert!(!model.sort_on_header_click(9));
        assert_eq!(model.sorted_column(), Some(0));
        assert_eq!(model.real_row(0), Some(2));
        assert_eq!(model.revision(), before);
    }

    /// A source that calls back into its model the first time its row count
    /// is queried.
    struct ReentrantSource {
        grid: GridSource,
        model: OnceLock<Weak<AggregateTableModel>>,
        fired: AtomicBool,
    }

    impl TableSource for ReentrantSource {
        fn row_count(&self) -> usize {
            if !self.fired.swap(true, Ordering::SeqCst) {
                if let Some(model) = self.model.get().and_then(Weak::upgrade) {
                    model.clear();
                }
            }
            self.grid.row_count()
        }

        fn column_count(&self) -> usize {
            self.grid.column_count()
        }

        fn column_name(&self, column: usize) -> String {
            self.grid.column_name(column)
        }

        fn value(&self, row: usize, column: usize) -> Option<CellValue> {
            self.grid.value(row, column)
        }
    }

    #[test]
    fn test_source_may_reenter_model() {
        let source = Arc::new(ReentrantSource {
            grid: GridSource::from_column(
                GridColumn::new("v", ColumnClass::Integer),
                vec![Some(1.into()), Some(2.into())],
            ),
            model: OnceLock::new(),
            fired: AtomicBool::new(true),
        });
        let model = Arc::new(AggregateTableModel::new());
        model.add_source(source.clone());
        assert!(source.model.set(Arc::downgrade(&model)).is_ok());
        source.fired.store(false, Ordering::SeqCst);

        // The query answers from the bindings as they were when it started.
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.source_count(), 0);
        assert_eq!(model.row_count(), 0);
    }

    #[test]
    fn test_signals_fire_outside_locks() {
        let model = Arc::new(AggregateTableModel::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let model_clone = Arc::downgrade(&model);
        let seen_clone = seen.clone();
        model.signals().structure_changed.connect(move |_| {
            if let Some(model) = model_clone.upgrade() {
                seen_clone.lock().push(model.column_count());
            }
        });

        model.add_source(int_source(2, 2));
        model.set_row_number_visible(true);
        assert_eq!(*seen.lock(), vec![2, 3]);
    }

    #[test]
    fn test_row_number_toggle_is_idempotent() {
        let model = AggregateTableModel::new();
        let before = model.revision();
        model.set_row_number_visible(false);
        assert_eq!(model.revision(), before);
        model.set_row_number_visible(true);
        assert!(model.revision() > before);
    }

    #[test]
    fn test_with_config() {
        let config = TableConfig::default()
            .with_row_number_visible(true)
            .with_row_number_header("#")
            .with_defer_refresh(true);
        let model = AggregateTableModel::with_config(config).unwrap();
        assert!(model.is_row_number_visible());
        assert_eq!(model.column_name(0), "#");
        assert!(model.signals().is_refresh_deferred());

        let bad = TableConfig::default().with_row_number_header("");
        assert!(AggregateTableModel::with_config(bad).is_err());
    }
}
