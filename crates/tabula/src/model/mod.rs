//! Aggregated table model.
//!
//! This module combines several independent tabular data sources into one
//! logical table that a grid view can consume without knowing where each
//! column comes from. It provides:
//!
//! - Per-source column visibility and row stride
//! - An optional leading row-number column
//! - Sorting through a row projection that never mutates the sources
//! - Change notification via signals and a revision counter
//!
//! # Core Types
//!
//! - `TableSource`: The trait every data source implements
//! - `CellValue` / `ColumnClass`: Cell values and declared column types
//! - `AggregateTableModel`: The combined model; itself a `TableSource`
//! - `ModelSignals`: Signals for change notifications
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ TableSource  │────>│ BindingTable │────>│  Aggregate   │──> consumer
//! │ (per source) │     │ stride, mask │     │  TableModel  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                                             │         │
//!                                   ┌─────────┘         └─────────┐
//!                                   v                             v
//!                            SortProjection                  ModelSignals
//!                          sorted row -> real row         changes, refresh
//! ```
//!
//! Consumers address cells by sorted row and logical column. The model maps
//! the sorted row through the projection to a real row, resolves the logical
//! column to a binding, then multiplies by the binding's stride to reach the
//! source row.

mod aggregate;
mod binding;
mod row_number;
mod signals;
mod sort;
mod source;
mod value;

pub use aggregate::{AggregateTableModel, UNKNOWN_COLUMN_NAME};
pub use binding::{BindingTable, ResolvedColumn, SourceBinding};
pub use row_number::{
    DEFAULT_ROW_NUMBER_HEADER, ROW_NUMBER_BASE, RowNumberOverlay, validate_header,
};
pub use signals::{ModelSignals, RefreshMode};
pub use sort::{SortFailure, SortProjection, compare_cells};
pub use source::{GridColumn, GridSource, TableSource, same_source};
pub use value::{CellValue, ColumnClass};
