//! Sort-key types and the scalar comparator used by the merge heap.

use std::cmp::Ordering;

use crate::ScalarValue;

/// Sort direction for one pushed-down ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One pushed-down ordering key, resolved to an output column position.
#[derive(Debug, Clone, Copy)]
pub struct SortKey {
    /// Position of the key in the decoded output row.
    pub column: usize,
    pub direction: SortDirection,
    /// When true, nulls sort before all non-null values regardless of
    /// direction.
    pub nulls_first: bool,
}

impl SortKey {
    pub fn ascending(column: usize) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
            nulls_first: false,
        }
    }

    pub fn descending(column: usize) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
            nulls_first: true,
        }
    }
}

/// Compare two scalars under one sort key.
///
/// Null ordering is applied first and is unaffected by direction; the
/// direction only reverses the comparison of two non-null values.
#[inline]
pub fn compare_values(a: &ScalarValue, b: &ScalarValue, key: &SortKey) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => {
            if key.nulls_first {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, true) => {
            if key.nulls_first {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, false) => {
            let ord = compare_non_null(a, b);
            match key.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
    }
}

/// SQL-style partial comparison: `None` when either side is null or the
/// tags are incomparable.
///
/// Ints and floats compare numerically against each other; floats use IEEE
/// total ordering so NaN payloads cannot poison an ordering.
#[inline]
pub fn compare_sql(a: &ScalarValue, b: &ScalarValue) -> Option<Ordering> {
    use ScalarValue::*;
    match (a, b) {
        (Int(x), Int(y)) => Some(x.cmp(y)),
        (Float(x), Float(y)) => Some(x.total_cmp(y)),
        (Int(x), Float(y)) => Some((*x as f64).total_cmp(y)),
        (Float(x), Int(y)) => Some(x.total_cmp(&(*y as f64))),
        (Str(x), Str(y)) => Some(x.as_ref().cmp(y.as_ref())),
        (Bool(x), Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order over non-null scalars.
///
/// A sort key always addresses one column of one declared type, so
/// mixed-tag comparisons only arise from corrupted plans; they fall back to
/// an arbitrary but stable tag order rather than panicking in the hot
/// comparator.
fn compare_non_null(a: &ScalarValue, b: &ScalarValue) -> Ordering {
    compare_sql(a, b).unwrap_or_else(|| tag_rank(a).cmp(&tag_rank(b)))
}

fn tag_rank(v: &ScalarValue) -> u8 {
    match v {
        ScalarValue::Null => 0,
        ScalarValue::Bool(_) => 1,
        ScalarValue::Int(_) => 2,
        ScalarValue::Float(_) => 2,
        ScalarValue::Str(_) => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asc(nulls_first: bool) -> SortKey {
        SortKey {
            column: 0,
            direction: SortDirection::Ascending,
            nulls_first,
        }
    }

    fn desc(nulls_first: bool) -> SortKey {
        SortKey {
            column: 0,
            direction: SortDirection::Descending,
            nulls_first,
        }
    }

    #[test]
    fn int_ordering_respects_direction() {
        let one = ScalarValue::Int(1);
        let two = ScalarValue::Int(2);
        assert_eq!(compare_values(&one, &two, &asc(false)), Ordering::Less);
        assert_eq!(compare_values(&one, &two, &desc(false)), Ordering::Greater);
        assert_eq!(compare_values(&two, &two, &asc(false)), Ordering::Equal);
    }

    #[test]
    fn nulls_sort_per_flag_independent_of_direction() {
        let null = ScalarValue::Null;
        let one = ScalarValue::Int(1);
        assert_eq!(compare_values(&null, &one, &asc(true)), Ordering::Less);
        assert_eq!(compare_values(&null, &one, &asc(false)), Ordering::Greater);
        assert_eq!(compare_values(&null, &one, &desc(true)), Ordering::Less);
        assert_eq!(compare_values(&null, &one, &desc(false)), Ordering::Greater);
        assert_eq!(compare_values(&null, &null, &asc(true)), Ordering::Equal);
    }

    #[test]
    fn int_and_float_compare_numerically() {
        let i = ScalarValue::Int(3);
        let f = ScalarValue::Float(2.5);
        assert_eq!(compare_values(&i, &f, &asc(false)), Ordering::Greater);
        assert_eq!(compare_values(&f, &i, &asc(false)), Ordering::Less);
    }

    #[test]
    fn strings_compare_lexicographically() {
        let a: ScalarValue = "abc".into();
        let b: ScalarValue = "abd".into();
        assert_eq!(compare_values(&a, &b, &asc(false)), Ordering::Less);
    }
}
