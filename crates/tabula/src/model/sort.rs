//! Sort projection: a row permutation kept apart from the data.
//!
//! The projection never reorders a source. It holds `indexes`, where
//! `indexes[i]` is the real (unsorted) row displayed at sorted position `i`,
//! plus the column the rows were last sorted by.
//!
//! Sorting is descending with absent values last. Numeric columns take a
//! fast path that reads every key once and sorts with a stable `sort_by`;
//! other columns use a stable insertion sort over a mixed-type comparator.
//! Both paths start from the identity permutation, so ties keep ascending
//! real-row order and re-sorting unchanged data yields the same permutation.

use std::cmp::Ordering;

use super::value::CellValue;

/// A permutation of `[0, len)` plus the last sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortProjection {
    indexes: Vec<usize>,
    sorted_column: Option<usize>,
}

impl SortProjection {
    /// Creates an empty, unsorted projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an identity projection over `len` rows.
    pub fn identity(len: usize) -> Self {
        Self {
            indexes: (0..len).collect(),
            sorted_column: None,
        }
    }

    /// Number of rows covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns `true` if the projection covers no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// The permutation itself.
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    /// The column last sorted by, or `None` when unsorted.
    #[inline]
    pub fn sorted_column(&self) -> Option<usize> {
        self.sorted_column
    }

    /// Replaces the permutation with the identity over `len` rows.
    ///
    /// The recorded sort column is kept: reallocation only restores a valid
    /// permutation, it does not re-sort.
    pub fn reallocate(&mut self, len: usize) {
        self.indexes.clear();
        self.indexes.extend(0..len);
    }

    /// Reallocates if the permutation does not cover exactly `len` rows.
    /// Returns `true` if it had to.
    pub fn ensure_len(&mut self, len: usize) -> bool {
        if self.indexes.len() == len {
            return false;
        }
        self.reallocate(len);
        true
    }

    /// Identity permutation over `len` rows, unsorted.
    pub fn reset(&mut self, len: usize) {
        self.reallocate(len);
        self.sorted_column = None;
    }

    /// Real row shown at `sorted_row`.
    #[inline]
    pub fn real_row(&self, sorted_row: usize) -> Option<usize> {
        self.indexes.get(sorted_row).copied()
    }

    /// Reverse lookup: sorted position of `real_row` (linear scan).
    pub fn sorted_row_of(&self, real_row: usize) -> Option<usize> {
        self.indexes.iter().position(|&r| r == real_row)
    }

    /// Records `column` as the sort key without changing the permutation.
    pub(crate) fn mark_sorted(&mut self, column: usize) {
        self.sorted_column = Some(column);
    }

    /// Installs a freshly computed order.
    ///
    /// The order must be a permutation of the current length; anything else
    /// is ignored and the projection stays as it was.
    pub(crate) fn apply(&mut self, order: Vec<usize>) -> bool {
        if !is_permutation(&order, self.indexes.len()) {
            return false;
        }
        self.indexes = order;
        true
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &row in order {
        match seen.get_mut(row) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// A sort that gave up. The permutation is left untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SortFailure {
    /// A numeric column produced a value that is not a number.
    #[error("row {row} of a numeric column holds non-numeric value '{value}'")]
    NonNumeric {
        /// Real row of the offending cell.
        row: usize,
        /// The offending value.
        value: CellValue,
    },
}

/// Orders two cells for display: present before absent, numbers descending
/// (integers and reals mixed), everything else descending by text.
///
/// `Ordering::Less` means `a` is shown first.
pub fn compare_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(a), Some(b)) => match b.numeric_cmp(a) {
            Some(ordering) => ordering,
            None => b.to_string().cmp(&a.to_string()),
        },
    }
}

/// Numeric fast path.
///
/// Reads one key per real row, fails on the first non-numeric value, then
/// stable-sorts descending with absent keys last.
pub(crate) fn sort_numeric<F>(row_count: usize, read: F) -> Result<Vec<usize>, SortFailure>
where
    F: Fn(usize) -> Option<CellValue>,
{
    let mut keys = Vec::with_capacity(row_count);
    let mut all_integers = true;
    for row in 0..row_count {
        let key = match read(row) {
            None => None,
            Some(value) if value.is_numeric() => {
                all_integers &= value.as_int().is_some();
                Some(value)
            }
            Some(value) => return Err(SortFailure::NonNumeric { row, value }),
        };
        keys.push(key);
    }

    let mut order: Vec<usize> = (0..row_count).collect();
    if all_integers {
        let ints: Vec<Option<i64>> = keys
            .iter()
            .map(|k| k.as_ref().and_then(CellValue::as_int))
            .collect();
        order.sort_by(|&a, &b| descending_absent_last(ints[a], ints[b], |x, y| y.cmp(&x)));
    } else {
        let reals: Vec<Option<f64>> = keys
            .iter()
            .map(|k| k.as_ref().and_then(CellValue::as_number))
            .collect();
        order.sort_by(|&a, &b| {
            descending_absent_last(reals[a], reals[b], |x, y| y.total_cmp(&x))
        });
    }
    Ok(order)
}

fn descending_absent_last<T: Copy>(
    a: Option<T>,
    b: Option<T>,
    descending: impl Fn(T, T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => descending(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fallback for non-numeric columns.
///
/// Mixed numeric/text comparisons are not guaranteed transitive, so this
/// uses an insertion sort, which terminates with a valid permutation for any
/// comparator. It is quadratic and stable.
pub(crate) fn sort_mixed<F>(row_count: usize, read: F) -> Vec<usize>
where
    F: Fn(usize) -> Option<CellValue>,
{
    let keys: Vec<Option<CellValue>> = (0..row_count).map(read).collect();
    let mut order: Vec<usize> = (0..row_count).collect();
    for i in 1..order.len() {
        let mut j = i;
        while j > 0
            && compare_cells(keys[order[j]].as_ref(), keys[order[j - 1]].as_ref())
                == Ordering::Less
        {
            order.swap(j, j - 1);
            j -= 1;
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[Option<CellValue>]) -> impl Fn(usize) -> Option<CellValue> + '_ {
        move |row| values[row].clone()
    }

    #[test]
    fn test_reset_is_identity() {
        let mut projection = SortProjection::new();
        projection.reset(4);
        assert_eq!(projection.indexes(), &[0, 1, 2, 3]);
        assert_eq!(projection.sorted_column(), None);
        for i in 0..4 {
            assert_eq!(projection.sorted_row_of(i), Some(i));
        }
    }

    #[test]
    fn test_reallocate_keeps_sort_column() {
        let mut projection = SortProjection::identity(3);
        projection.mark_sorted(2);
        assert!(projection.apply(vec![2, 0, 1]));
        assert!(projection.ensure_len(5));
        assert_eq!(projection.indexes(), &[0, 1, 2, 3, 4]);
        assert_eq!(projection.sorted_column(), Some(2));
        assert!(!projection.ensure_len(5));
    }

    #[test]
    fn test_apply_rejects_non_permutation() {
        let mut projection = SortProjection::identity(3);
        assert!(!projection.apply(vec![0, 0, 1]));
        assert!(!projection.apply(vec![0, 1]));
        assert!(!projection.apply(vec![0, 1, 3]));
        assert_eq!(projection.indexes(), &[0, 1, 2]);
    }

    #[test]
    fn test_sorted_row_of_missing() {
        let projection = SortProjection::identity(2);
        assert_eq!(projection.sorted_row_of(7), None);
        assert_eq!(projection.real_row(7), None);
    }

    #[test]
    fn test_compare_cells() {
        let a = CellValue::from("a");
        let b = CellValue::from("b");
        assert_eq!(compare_cells(Some(&b), Some(&a)), Ordering::Less);
        assert_eq!(compare_cells(Some(&a), None), Ordering::Less);
        assert_eq!(compare_cells(None, Some(&a)), Ordering::Greater);
        assert_eq!(compare_cells(None, None), Ordering::Equal);
        assert_eq!(
            compare_cells(Some(&CellValue::Int(2)), Some(&CellValue::Float(1.5))),
            Ordering::Less
        );
    }

    #[test]
    fn test_numeric_descending_absent_last() {
        let values = vec![
            Some(CellValue::Float(-1.0)),
            None,
            Some(CellValue::Float(3.0)),
            Some(CellValue::Float(0.5)),
        ];
        let order = sort_numeric(values.len(), cells(&values)).unwrap();
        assert_eq!(order, vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_numeric_ties_keep_row_order() {
        let values = vec![
            Some(CellValue::Int(1)),
            Some(CellValue::Int(5)),
            Some(CellValue::Int(1)),
            Some(CellValue::Int(5)),
        ];
        let order = sort_numeric(values.len(), cells(&values)).unwrap();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_numeric_rejects_text() {
        let values = vec![Some(CellValue::Int(1)), Some(CellValue::from("x"))];
        let err = sort_numeric(values.len(), cells(&values)).unwrap_err();
        assert_eq!(
            err,
            SortFailure::NonNumeric {
                row: 1,
                value: CellValue::from("x")
            }
        );
    }

    #[test]
    fn test_mixed_strings_descending_absent_last() {
        let values = vec![
            Some(CellValue::from("b")),
            None,
            Some(CellValue::from("a")),
            Some(CellValue::from("b")),
        ];
        let order = sort_mixed(values.len(), cells(&values));
        assert_eq!(order, vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_mixed_numbers_descending() {
        let values = vec![
            Some(CellValue::Int(2)),
            Some(CellValue::Float(7.5)),
            Some(CellValue::from("z")),
            Some(CellValue::Int(9)),
        ];
        let order = sort_mixed(values.len(), cells(&values));
        // "z" sorts above every number by text; numbers among themselves by value.
        assert_eq!(order, vec![2, 3, 1, 0]);
    }

    #[test]
    fn test_mixed_intransitive_input_still_permutation() {
        let values = vec![
            Some(CellValue::Int(9)),
            Some(CellValue::Int(10)),
            Some(CellValue::from("9")),
        ];
        let order = sort_mixed(values.len(), cells(&values));
        assert!(is_permutation(&order, 3));
    }
}
