//! The optional synthetic row-number column.
//!
//! When shown, the row-number column is logical column 0. It is read-only,
//! typed [`ColumnClass::Integer`], and never resolved against a source.

use super::value::{CellValue, ColumnClass};
use crate::error::{Error, Result};

/// Number displayed for real row 0. The displayed number of real row `r` is
/// `r + ROW_NUMBER_BASE`.
pub const ROW_NUMBER_BASE: usize = 0;

/// Default header text of the row-number column.
pub const DEFAULT_ROW_NUMBER_HEADER: &str = "row";

/// Rejects header text that would render as an empty column title.
pub fn validate_header(header: &str) -> Result<()> {
    if header.trim().is_empty() {
        return Err(Error::EmptyHeader);
    }
    Ok(())
}

/// Visibility and header text of the row-number column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowNumberOverlay {
    visible: bool,
    header: String,
}

impl Default for RowNumberOverlay {
    fn default() -> Self {
        Self {
            visible: false,
            header: DEFAULT_ROW_NUMBER_HEADER.to_string(),
        }
    }
}

impl RowNumberOverlay {
    /// Creates a hidden overlay with the default header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the column is shown.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the column. Returns `true` if this changed anything.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        std::mem::replace(&mut self.visible, visible) != visible
    }

    /// Header text.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Sets the header text.
    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = header.into();
    }

    /// Number of logical columns the overlay occupies (0 or 1).
    #[inline]
    pub fn width(&self) -> usize {
        usize::from(self.visible)
    }

    /// Returns `true` if `logical` is the row-number column.
    #[inline]
    pub fn is_row_number_column(&self, logical: usize) -> bool {
        self.visible && logical == 0
    }

    /// Maps a logical column to a data column (row-number column removed).
    /// Returns `None` for the row-number column itself.
    pub fn data_column(&self, logical: usize) -> Option<usize> {
        if self.visible {
            logical.checked_sub(1)
        } else {
            Some(logical)
        }
    }

    /// Value shown for `real_row`.
    pub fn value(real_row: usize) -> CellValue {
        CellValue::from(real_row + ROW_NUMBER_BASE)
    }

    /// Type of the column.
    pub const fn column_class() -> ColumnClass {
        ColumnClass::Integer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_overlay_passes_columns_through() {
        let overlay = RowNumberOverlay::new();
        assert_eq!(overlay.width(), 0);
        assert!(!overlay.is_row_number_column(0));
        assert_eq!(overlay.data_column(0), Some(0));
        assert_eq!(overlay.data_column(3), Some(3));
    }

    #[test]
    fn test_visible_overlay_shifts_columns() {
        let mut overlay = RowNumberOverlay::new();
        assert!(overlay.set_visible(true));
        assert!(!overlay.set_visible(true));
        assert_eq!(overlay.width(), 1);
        assert!(overlay.is_row_number_column(0));
        assert_eq!(overlay.data_column(0), None);
        assert_eq!(overlay.data_column(1), Some(0));
    }

    #[test]
    fn test_validate_header() {
        assert!(validate_header(DEFAULT_ROW_NUMBER_HEADER).is_ok());
        assert!(validate_header("#").is_ok());
        assert_eq!(validate_header(""), Err(Error::EmptyHeader));
        assert_eq!(validate_header(" \t"), Err(Error::EmptyHeader));
    }

    #[test]
    fn test_value_uses_base() {
        assert_eq!(
            RowNumberOverlay::value(4),
            CellValue::Int((4 + ROW_NUMBER_BASE) as i64)
        );
        assert_eq!(RowNumberOverlay::column_class(), ColumnClass::Integer);
    }
}
