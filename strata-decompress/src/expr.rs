//! Residual filter predicates and output projection expressions.
//!
//! The planner pushes whatever it could into the storage scan; what remains
//! is a small residual predicate evaluated against each decoded row, plus an
//! optional projection list. Both use positions into the decoded output row.

use std::cmp::Ordering;

use strata_result::{Error, Result};
use strata_types::{ScalarValue, compare_sql};

/// Comparison operators for residual predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Residual predicate over one decoded row.
///
/// Evaluation follows SQL three-valued logic: a comparison involving null is
/// unknown, and only rows evaluating to true qualify. Rejection is not an
/// error; rejected rows are skipped and counted for diagnostics.
#[derive(Debug, Clone)]
pub enum FilterExpr {
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
    Compare {
        column: usize,
        op: CompareOp,
        value: ScalarValue,
    },
}

impl FilterExpr {
    pub fn compare<V: Into<ScalarValue>>(column: usize, op: CompareOp, value: V) -> Self {
        FilterExpr::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    /// True when the row qualifies.
    #[inline]
    pub fn matches(&self, row: &[ScalarValue]) -> bool {
        self.eval(row) == Some(true)
    }

    /// Three-valued evaluation; `None` is SQL unknown.
    fn eval(&self, row: &[ScalarValue]) -> Option<bool> {
        match self {
            FilterExpr::And(children) => {
                let mut unknown = false;
                for child in children {
                    match child.eval(row) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                if unknown { None } else { Some(true) }
            }
            FilterExpr::Or(children) => {
                let mut unknown = false;
                for child in children {
                    match child.eval(row) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                if unknown { None } else { Some(false) }
            }
            FilterExpr::Not(child) => child.eval(row).map(|b| !b),
            FilterExpr::Compare { column, op, value } => {
                let cell = row.get(*column)?;
                let ord = compare_sql(cell, value)?;
                Some(match op {
                    CompareOp::Eq => ord == Ordering::Equal,
                    CompareOp::NotEq => ord != Ordering::Equal,
                    CompareOp::Lt => ord == Ordering::Less,
                    CompareOp::LtEq => ord != Ordering::Greater,
                    CompareOp::Gt => ord == Ordering::Greater,
                    CompareOp::GtEq => ord != Ordering::Less,
                })
            }
        }
    }

    /// Check every referenced column position against the output row width.
    pub(crate) fn validate_columns(&self, width: usize) -> Result<()> {
        match self {
            FilterExpr::And(children) | FilterExpr::Or(children) => {
                for child in children {
                    child.validate_columns(width)?;
                }
                Ok(())
            }
            FilterExpr::Not(child) => child.validate_columns(width),
            FilterExpr::Compare { column, .. } => {
                if *column >= width {
                    return Err(Error::InvalidScanConfig(format!(
                        "residual filter references output column {column} but the output row has {width} columns"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// One element of the projection list applied after the residual filter.
#[derive(Debug, Clone)]
pub enum OutputExpr {
    /// Pass through a decoded output column.
    Column(usize),
    /// A constant.
    Literal(ScalarValue),
    /// Pseudo-column identifying the original uncompressed source of each
    /// row. Decoded rows are synthesized and carry no system identity, so
    /// this is rewritten at open time to a literal naming the logical
    /// source partition.
    SourcePartition,
}
