//! The operator driver: open / next / rescan / close over either
//! decompression mode, plus the residual filter and projection.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use strata_result::{Error, Result};
use strata_types::ScalarValue;

use crate::codec::Codec;
use crate::expr::OutputExpr;
use crate::merge::MergeDecompress;
use crate::plan::ScanPlan;
use crate::scan::CompressedBatchScan;
use crate::single::SingleStream;

enum Mode {
    Single(SingleStream),
    Merge(MergeDecompress),
}

/// Decompression scan operator.
///
/// Owns its sub-scan, codec, and all decode state exclusively; one caller
/// thread drives `next` pulls. Rows are returned by reference into a
/// reusable operator-owned buffer valid until the following call.
pub struct DecompressScan<S, C> {
    plan: ScanPlan,
    scan: S,
    codec: C,
    mode: Mode,
    /// Projection with source-identity references already rewritten.
    projection: Option<Vec<OutputExpr>>,
    out_buf: Vec<ScalarValue>,
    rows_filtered: u64,
    abort: Option<Arc<AtomicBool>>,
}

impl<S, C> std::fmt::Debug for DecompressScan<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecompressScan")
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl<S: CompressedBatchScan, C: Codec> DecompressScan<S, C> {
    /// Validate the plan, rewrite the projection, and pick a mode. All
    /// batch work is deferred to the first `next` call.
    pub fn open(plan: ScanPlan, scan: S, codec: C) -> Result<Self> {
        plan.validate()?;
        let projection = rewrite_projection(plan.projection.clone(), plan.source_label.as_ref())?;

        let mode = if plan.merge_append {
            Mode::Merge(MergeDecompress::new(&plan))
        } else {
            Mode::Single(SingleStream::new(&plan))
        };

        let out_width = projection
            .as_ref()
            .map_or(plan.schema.width(), |exprs| exprs.len());

        Ok(Self {
            plan,
            scan,
            codec,
            mode,
            projection,
            out_buf: Vec::with_capacity(out_width),
            rows_filtered: 0,
            abort: None,
        })
    }

    /// Install a shared abort flag, checked once per batch fetched.
    pub fn with_abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Produce the next qualifying output row, or `None` at end of stream.
    pub fn next(&mut self) -> Result<Option<&[ScalarValue]>> {
        loop {
            let row = match &mut self.mode {
                Mode::Single(single) => {
                    single.next_row(&mut self.scan, &self.codec, &self.plan, self.abort.as_deref())?
                }
                Mode::Merge(merge) => {
                    merge.next_row(&mut self.scan, &self.codec, &self.plan, self.abort.as_deref())?
                }
            };
            let Some(row) = row else {
                return Ok(None);
            };

            if let Some(filter) = &self.plan.filter {
                if !filter.matches(row) {
                    self.rows_filtered += 1;
                    continue;
                }
            }

            self.out_buf.clear();
            match &self.projection {
                Some(exprs) => {
                    for expr in exprs {
                        self.out_buf.push(eval_output(expr, row)?);
                    }
                }
                None => self.out_buf.extend_from_slice(row),
            }
            break;
        }

        Ok(Some(&self.out_buf))
    }

    /// Discard all decode state and re-drive the sub-scan from the start.
    /// A drained operator re-driven this way reproduces the identical row
    /// sequence.
    pub fn rescan(&mut self) -> Result<()> {
        match &mut self.mode {
            Mode::Single(single) => single.reset(),
            Mode::Merge(merge) => merge.reset(),
        }
        self.scan.rescan()
    }

    /// Release every open batch state and the sub-scan. Dropping the
    /// operator has the same effect; this spells the lifecycle out.
    pub fn close(self) {}

    /// Whether this scan merge-interleaves batches to preserve a pushed-down
    /// order. Exposed for plan introspection.
    pub fn merge_append(&self) -> bool {
        self.plan.merge_append
    }

    /// Rows rejected by the residual filter so far.
    pub fn rows_filtered(&self) -> u64 {
        self.rows_filtered
    }
}

/// Rewrite source-identity pseudo-column references to literal constants.
///
/// Decoded rows are synthesized and carry no system identity, so the only
/// supported reference is the one naming the source partition, and only
/// when the plan provides a label for it.
fn rewrite_projection(
    projection: Option<Vec<OutputExpr>>,
    source_label: Option<&Arc<str>>,
) -> Result<Option<Vec<OutputExpr>>> {
    let Some(exprs) = projection else {
        return Ok(None);
    };
    let rewritten = exprs
        .into_iter()
        .map(|expr| match expr {
            OutputExpr::SourcePartition => match source_label {
                Some(label) => Ok(OutputExpr::Literal(ScalarValue::Str(Arc::clone(label)))),
                None => Err(Error::UnsupportedShape(
                    "projection references the source partition pseudo-column but the plan names no source partition".into(),
                )),
            },
            other => Ok(other),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(rewritten))
}

fn eval_output(expr: &OutputExpr, row: &[ScalarValue]) -> Result<ScalarValue> {
    match expr {
        OutputExpr::Column(column) => Ok(row[*column].clone()),
        OutputExpr::Literal(value) => Ok(value.clone()),
        OutputExpr::SourcePartition => Err(Error::Internal(
            "source partition pseudo-column survived projection rewrite".into(),
        )),
    }
}
