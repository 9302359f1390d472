//! Cell values and column type tags.
//!
//! A cell either holds a [`CellValue`] or holds nothing. Absence is always
//! expressed as `Option<CellValue>::None`, never as a variant, so "no value"
//! cannot be confused with an empty string or a zero.

use std::cmp::Ordering;
use std::fmt;

/// A value stored in (or read from) a table cell.
///
/// # Example
///
/// ```
/// use tabula::model::CellValue;
///
/// let v = CellValue::from(3);
/// assert_eq!(v.as_int(), Some(3));
/// assert_eq!(v.as_number(), Some(3.0));
///
/// let s = CellValue::from("x");
/// assert_eq!(s.to_string(), "x");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    String(String),
}

impl CellValue {
    /// Returns the integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value widened to `f64` if it is an `Int` or a `Float`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns `true` for `Int` and `Float`.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }

    /// Compares two numeric values, keeping integer precision when both are
    /// integers. Returns `None` if either side is not numeric.
    ///
    /// Floats use IEEE total ordering, so `NaN` is ordered rather than
    /// poisoning the comparison.
    pub fn numeric_cmp(&self, other: &CellValue) -> Option<Ordering> {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => Some(a.cmp(b)),
            _ => {
                let a = self.as_number()?;
                let b = other.as_number()?;
                Some(a.total_cmp(&b))
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

/// The declared value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnClass {
    /// Whole numbers.
    Integer,
    /// Real numbers.
    Real,
    /// Text.
    String,
    /// Anything else, or unknown.
    #[default]
    Other,
}

impl ColumnClass {
    /// Returns `true` for `Integer` and `Real`.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnClass::Integer | ColumnClass::Real)
    }
}
