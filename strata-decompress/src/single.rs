//! Single-stream decompression: one batch open at a time, drained fully
//! before the next carrier row is fetched.
//!
//! Used when output order need not match a specific global ordering; rows
//! come out in batch arrival order with intra-batch storage order
//! preserved.

use std::sync::atomic::AtomicBool;

use strata_result::Result;
use strata_types::ScalarValue;

use crate::batch::BatchState;
use crate::check_abort;
use crate::codec::Codec;
use crate::plan::ScanPlan;
use crate::scan::CompressedBatchScan;

/// The need-batch / decoding / finished loop over a single batch state.
pub(crate) struct SingleStream {
    state: BatchState,
    /// False while a fresh carrier row is needed before decoding.
    initialized: bool,
    /// Sub-scan exhausted; end of stream is terminal until a rescan.
    finished: bool,
}

impl SingleStream {
    pub fn new(plan: &ScanPlan) -> Self {
        Self {
            state: BatchState::new(plan),
            initialized: false,
            finished: false,
        }
    }

    /// Decode the next row, pulling a new compressed batch from the scan
    /// whenever the current one is exhausted.
    pub fn next_row<S: CompressedBatchScan, C: Codec>(
        &mut self,
        scan: &mut S,
        codec: &C,
        plan: &ScanPlan,
        abort: Option<&AtomicBool>,
    ) -> Result<Option<&[ScalarValue]>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            if !self.initialized {
                check_abort(abort)?;
                match scan.next_batch()? {
                    Some(batch) => {
                        self.state.init(&batch, codec, plan)?;
                        self.initialized = true;
                    }
                    None => {
                        self.finished = true;
                        self.state.clear();
                        return Ok(None);
                    }
                }
            }

            if self.state.advance(plan)? {
                return Ok(Some(self.state.row()));
            }

            // Batch drained without producing a row; fetch the next one.
            self.initialized = false;
        }
    }

    /// Drop the open batch; the next call starts from a fresh sub-scan.
    pub fn reset(&mut self) {
        self.state.clear();
        self.initialized = false;
        self.finished = false;
    }
}
