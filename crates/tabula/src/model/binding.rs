//! Source registration: bindings of data sources to per-source view policy.
//!
//! Each registered source gets a [`SourceBinding`] holding the set of hidden
//! columns and a row stride. The [`BindingTable`] keeps bindings in
//! registration order and answers which binding, and which source column, a
//! logical column belongs to.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tabula_core::logging::targets;

use super::source::{TableSource, same_source};
use crate::error::{Error, Result};

/// One data source together with its hidden columns and stride.
#[derive(Clone)]
pub struct SourceBinding {
    source: Arc<dyn TableSource>,
    /// Source columns hidden from the aggregate. Every other column is
    /// visible, including ones the source does not have yet.
    hidden: BTreeSet<usize>,
    /// Only every `stride`-th source row is exposed. Always >= 1.
    stride: usize,
}

impl SourceBinding {
    /// Creates a binding with stride 1 and every column visible.
    pub fn new(source: Arc<dyn TableSource>) -> Self {
        Self {
            source,
            hidden: BTreeSet::new(),
            stride: 1,
        }
    }

    /// Returns the bound source.
    pub fn source(&self) -> &Arc<dyn TableSource> {
        &self.source
    }

    /// Returns the row stride.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Sets the row stride. Rejects `0`.
    pub fn set_stride(&mut self, stride: usize) -> Result<()> {
        if stride < 1 {
            return Err(Error::InvalidStride { stride });
        }
        self.stride = stride;
        Ok(())
    }

    /// Hidden source columns, ascending.
    pub fn hidden_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.hidden.iter().copied()
    }

    /// Returns whether a source column is visible.
    #[inline]
    pub fn is_column_visible(&self, column: usize) -> bool {
        !self.hidden.contains(&column)
    }

    /// Sets the visibility of a source column. Any index is accepted; a
    /// column the source does not have stays hidden if the source grows.
    /// Returns `true` if this changed anything.
    pub fn set_column_visible(&mut self, column: usize, visible: bool) -> bool {
        if visible {
            self.hidden.remove(&column)
        } else {
            self.hidden.insert(column)
        }
    }

    /// Number of visible columns among the source's current columns.
    pub fn visible_column_count(&self) -> usize {
        (0..self.source.column_count())
            .filter(|&c| self.is_column_visible(c))
            .count()
    }

    /// Maps the `nth` visible column to its source column index.
    pub fn nth_visible_column(&self, nth: usize) -> Option<usize> {
        (0..self.source.column_count())
            .filter(|&c| self.is_column_visible(c))
            .nth(nth)
    }

    /// Number of rows this binding contributes: `ceil(rows / stride)`.
    pub fn exposed_row_count(&self) -> usize {
        self.source.row_count().div_ceil(self.stride)
    }

    /// Maps an aggregated row to a source row, or `None` if the source has
    /// run out of rows at that point.
    pub fn source_row(&self, row: usize) -> Option<usize> {
        let source_row = row.checked_mul(self.stride)?;
        (source_row < self.source.row_count()).then_some(source_row)
    }
}

impl fmt::Debug for SourceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBinding")
            .field("source", &Arc::as_ptr(&self.source))
            .field("hidden", &self.hidden)
            .field("stride", &self.stride)
            .finish()
    }
}

/// Where a logical column lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedColumn {
    /// The synthetic row-number column.
    RowNumber,
    /// A column of a bound source.
    Source {
        /// Index of the binding in registration order.
        binding: usize,
        /// Column index within that source.
        source_column: usize,
    },
}

/// The ordered list of bindings.
#[derive(Debug, Default, Clone)]
pub struct BindingTable {
    bindings: Vec<SourceBinding>,
}

impl BindingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a binding for `source`. Duplicates are allowed and each gets
    /// its own binding.
    pub fn add(&mut self, source: Arc<dyn TableSource>) {
        self.bindings.push(SourceBinding::new(source));
        tracing::debug!(target: targets::BINDING, count = self.bindings.len(), "source added");
    }

    /// Removes the first binding of `source`.
    pub fn remove(&mut self, source: &Arc<dyn TableSource>) -> Result<SourceBinding> {
        let position = self.position(source).ok_or(Error::UnknownSource)?;
        let removed = self.bindings.remove(position);
        tracing::debug!(target: targets::BINDING, position, count = self.bindings.len(), "source removed");
        Ok(removed)
    }

    /// Drops all bindings.
    pub fn clear(&mut self) {
        self.bindings.clear();
        tracing::debug!(target: targets::BINDING, "bindings cleared");
    }

    /// Linear scan for the first binding of `source`.
    pub fn position(&self, source: &Arc<dyn TableSource>) -> Option<usize> {
        self.bindings
            .iter()
            .position(|b| same_source(&b.source, source))
    }

    /// Returns the first binding of `source`.
    pub fn find(&self, source: &Arc<dyn TableSource>) -> Result<&SourceBinding> {
        self.position(source)
            .map(|i| &self.bindings[i])
            .ok_or(Error::UnknownSource)
    }

    /// Returns the first binding of `source`, mutably.
    pub fn find_mut(&mut self, source: &Arc<dyn TableSource>) -> Result<&mut SourceBinding> {
        let position = self.position(source).ok_or(Error::UnknownSource)?;
        Ok(&mut self.bindings[position])
    }

    /// Returns the binding at `index`.
    pub fn get(&self, index: usize) -> Option<&SourceBinding> {
        self.bindings.get(index)
    }

    /// Returns all bindings in order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceBinding> {
        self.bindings.iter()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Max over bindings of their exposed row count; 0 with no bindings.
    pub fn row_count(&self) -> usize {
        self.bindings
            .iter()
            .map(SourceBinding::exposed_row_count)
            .max()
            .unwrap_or(0)
    }

    /// Sum over bindings of their visible column count.
    pub fn column_count(&self) -> usize {
        self.bindings
            .iter()
            .map(SourceBinding::visible_column_count)
            .sum()
    }

    /// Resolves a data column index (row-number column already excluded) to
    /// a binding and source column.
    ///
    /// Walks the bindings accumulating visible column counts until the
    /// running total passes `column`; the remainder selects among that
    /// binding's visible columns only.
    pub fn resolve(&self, column: usize) -> Result<ResolvedColumn> {
        let mut before = 0;
        for (index, binding) in self.bindings.iter().enumerate() {
            let visible = binding.visible_column_count();
            if before + visible > column {
                let source_column = binding
                    .nth_visible_column(column - before)
                    .ok_or(Error::ColumnOutOfRange {
                        column,
                        column_count: self.column_count(),
                    })?;
                return Ok(ResolvedColumn::Source {
                    binding: index,
                    source_column,
                });
            }
            before += visible;
        }
        Err(Error::ColumnOutOfRange {
            column,
            column_count: before,
        })
    }
}
