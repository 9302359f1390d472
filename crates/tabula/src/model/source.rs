//! The data source contract and a simple in-memory source.
//!
//! A [`TableSource`] is any rectangular provider of cells. The aggregated
//! model never assumes anything about a source's internal representation:
//! it only asks for counts, column metadata and individual cells.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::value::{CellValue, ColumnClass};

/// The core trait for tabular data sources.
///
/// # Implementation Requirements
///
/// At minimum, you must implement:
/// - [`row_count`](TableSource::row_count) - Number of rows
/// - [`column_count`](TableSource::column_count) - Number of columns
/// - [`column_name`](TableSource::column_name) - Header text of a column
/// - [`value`](TableSource::value) - The value of a cell, or `None`
///
/// For editable sources, also implement:
/// - [`set_value`](TableSource::set_value) - Modify a cell
/// - [`is_cell_editable`](TableSource::is_cell_editable) - Report editability
///
/// Methods take `&self`; sources that support writes use interior
/// mutability, the same way the aggregated model itself does.
///
/// # Example
///
/// ```
/// use tabula::model::{CellValue, ColumnClass, TableSource};
///
/// struct Squares {
///     len: usize,
/// }
///
/// impl TableSource for Squares {
///     fn row_count(&self) -> usize {
///         self.len
///     }
///
///     fn column_count(&self) -> usize {
///         2
///     }
///
///     fn column_name(&self, column: usize) -> String {
///         if column == 0 { "n".into() } else { "n^2".into() }
///     }
///
///     fn column_class(&self, _column: usize) -> ColumnClass {
///         ColumnClass::Integer
///     }
///
///     fn value(&self, row: usize, column: usize) -> Option<CellValue> {
///         if row >= self.len {
///             return None;
///         }
///         let n = row as i64;
///         match column {
///             0 => Some(CellValue::Int(n)),
///             1 => Some(CellValue::Int(n * n)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait TableSource: Send + Sync {
    /// Returns the number of rows.
    fn row_count(&self) -> usize;

    /// Returns the number of columns.
    fn column_count(&self) -> usize;

    /// Returns the header text of a column.
    fn column_name(&self, column: usize) -> String;

    /// Returns the declared value type of a column.
    ///
    /// The default is [`ColumnClass::Other`].
    fn column_class(&self, _column: usize) -> ColumnClass {
        ColumnClass::Other
    }

    /// Returns the value of a cell, or `None` if the cell is empty or out of
    /// range.
    fn value(&self, row: usize, column: usize) -> Option<CellValue>;

    /// Writes a cell.
    ///
    /// The default implementation ignores the write (read-only source).
    fn set_value(&self, _row: usize, _column: usize, _value: CellValue) {}

    /// Returns `true` if the cell accepts writes.
    ///
    /// The default returns `false`.
    fn is_cell_editable(&self, _row: usize, _column: usize) -> bool {
        false
    }
}

/// Returns `true` if both handles point at the same source.
///
/// Identity is the address of the shared allocation; two sources with equal
/// content are still different sources.
pub fn same_source(a: &Arc<dyn TableSource>, b: &Arc<dyn TableSource>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Column metadata for a [`GridSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridColumn {
    /// Header text.
    pub name: String,
    /// Declared value type.
    pub class: ColumnClass,
}

impl GridColumn {
    /// Creates column metadata.
    pub fn new(name: impl Into<String>, class: ColumnClass) -> Self {
        Self {
            name: name.into(),
            class,
        }
    }
}

/// A simple table source that stores cells in a 2D vector.
///
/// This is useful for tests and for tables where you don't need a custom
/// source type. Rows shorter than the column count read as empty in their
/// missing cells.
///
/// # Example
///
/// ```
/// use tabula::model::{CellValue, ColumnClass, GridColumn, GridSource, TableSource};
///
/// let grid = GridSource::new(vec![
///     GridColumn::new("t", ColumnClass::Real),
///     GridColumn::new("x", ColumnClass::Real),
/// ]);
/// grid.push_row(vec![Some(0.0.into()), Some(1.0.into())]);
/// grid.push_row(vec![Some(0.1.into()), None]);
///
/// assert_eq!(grid.row_count(), 2);
/// assert_eq!(grid.value(1, 1), None);
/// ```
#[derive(Debug)]
pub struct GridSource {
    columns: Vec<GridColumn>,
    rows: RwLock<Vec<Vec<Option<CellValue>>>>,
    editable: AtomicBool,
}

impl GridSource {
    /// Creates an empty, editable grid with the given columns.
    pub fn new(columns: Vec<GridColumn>) -> Self {
        Self {
            columns,
            rows: RwLock::new(Vec::new()),
            editable: AtomicBool::new(true),
        }
    }

    /// Creates a grid from columns and rows.
    pub fn from_rows(columns: Vec<GridColumn>, rows: Vec<Vec<Option<CellValue>>>) -> Self {
        let grid = Self::new(columns);
        *grid.rows.write() = rows;
        grid
    }

    /// Creates a single-column grid from a list of optional values.
    pub fn from_column(column: GridColumn, values: Vec<Option<CellValue>>) -> Self {
        let rows = values.into_iter().map(|v| vec![v]).collect();
        Self::from_rows(vec![column], rows)
    }

    /// Sets whether writes are accepted.
    pub fn with_editable(self, editable: bool) -> Self {
        self.set_editable(editable);
        self
    }

    /// Sets whether writes are accepted.
    pub fn set_editable(&self, editable: bool) {
        self.editable.store(editable, Ordering::SeqCst);
    }

    /// Returns whether writes are accepted.
    pub fn is_editable(&self) -> bool {
        self.editable.load(Ordering::SeqCst)
    }

    /// Appends a row.
    pub fn push_row(&self, row: Vec<Option<CellValue>>) {
        self.rows.write().push(row);
    }

    /// Replaces all rows.
    pub fn set_rows(&self, rows: Vec<Vec<Option<CellValue>>>) {
        *self.rows.write() = rows;
    }

    /// Removes all rows.
    pub fn clear(&self) {
        self.rows.write().clear();
    }

    /// Returns the column metadata.
    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }
}

impl TableSource for GridSource {
    fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, column: usize) -> String {
        self.columns
            .get(column)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    fn column_class(&self, column: usize) -> ColumnClass {
        self.columns
            .get(column)
            .map(|c| c.class)
            .unwrap_or_default()
    }

    fn value(&self, row: usize, column: usize) -> Option<CellValue> {
        if column >= self.columns.len() {
            return None;
        }
        self.rows.read().get(row)?.get(column)?.clone()
    }

    fn set_value(&self, row: usize, column: usize, value: CellValue) {
        if !self.is_editable() || column >= self.columns.len() {
            return;
        }
        let mut rows = self.rows.write();
        if let Some(cells) = rows.get_mut(row) {
            if cells.len() <= column {
                cells.resize(column + 1, None);
            }
            cells[column] = Some(value);
        }
    }

    fn is_cell_editable(&self, row: usize, column: usize) -> bool {
        self.is_editable() && row < self.row_count() && column < self.columns.len()
    }
}

static_assertions::assert_impl_all!(GridSource: Send, Sync);
