//! Tabula - an aggregated, sortable table view-model.
//!
//! Tabula presents any number of tabular data sources as one table. Each
//! source contributes its visible columns side by side; rows are aligned by
//! index, thinned by a per-source stride, and can be reordered by sorting on
//! any column without touching the underlying data.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tabula::model::{AggregateTableModel, ColumnClass, GridColumn, GridSource, TableSource};
//!
//! let times: Arc<dyn TableSource> = Arc::new(GridSource::from_column(
//!     GridColumn::new("t", ColumnClass::Real),
//!     (0..10).map(|i| Some((i as f64 * 0.1).into())).collect(),
//! ));
//!
//! let model = AggregateTableModel::new();
//! model.add_source(times.clone());
//! model.set_stride(&times, 2)?;
//!
//! assert_eq!(model.row_count(), 5);
//! # Ok::<(), tabula::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use tabula_core::{Revision, Signal};
