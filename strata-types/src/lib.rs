//! Shared value model for the strata decompression engine.
//!
//! The engine decodes compressed column batches one scalar at a time, so the
//! core type here is [`ScalarValue`]: an owned, cheaply clonable scalar with
//! an explicit null variant. Strings are `Arc<str>` so that restating a
//! segment-constant value for every row of a batch never allocates.

use std::sync::Arc;

pub mod sort;

pub use sort::{SortDirection, SortKey, compare_sql, compare_values};

/// A tag representing the value type of an output column.
///
/// This is a simple, C-like enum that is cheap to store and copy. It labels
/// the decoded representation a codec must produce for a column; the wire
/// format of the compressed payload is the codec's own concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int64,
    Float64,
    Utf8,
    Bool,
}

/// One decoded scalar, nullability included.
///
/// This is the unit the row emission path traffics in: decode iterators
/// yield it, segment-constant slots cache it, and the reusable row buffer is
/// a `Vec` of it. `Clone` is cheap for every variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Bool(bool),
}

impl ScalarValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// The declared type this value satisfies, or `None` for null.
    #[inline]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            ScalarValue::Null => None,
            ScalarValue::Int(_) => Some(DataType::Int64),
            ScalarValue::Float(_) => Some(DataType::Float64),
            ScalarValue::Str(_) => Some(DataType::Utf8),
            ScalarValue::Bool(_) => Some(DataType::Bool),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Str(Arc::from(v))
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Str(Arc::from(v.as_str()))
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => ScalarValue::Null,
        }
    }
}

/// Opaque encoded payload of one compressed column for one batch.
///
/// Shared ownership: an open decode iterator keeps the payload alive on its
/// own, so recycling the carrier row for the next batch can never leave a
/// dangling reference behind.
pub type EncodedPayload = Arc<[u8]>;

/// Traversal direction for per-column decode iterators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}
