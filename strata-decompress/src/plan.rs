//! Planner-provided scan inputs: the decompression map, the output schema,
//! and the fixed per-scan settings.
//!
//! Everything here is resolved once at open from planning metadata and is
//! immutable afterwards. The operator never makes plan decisions of its own.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use strata_result::{Error, Result};
use strata_types::{DataType, ScalarValue, SortKey};

use crate::expr::{FilterExpr, OutputExpr};

/// What one physical compressed-input position contributes to the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEntry {
    /// Segment-constant column: the carrier row holds its raw value, fixed
    /// for every row of the batch, materialized at `output`.
    Segment { output: usize },
    /// Compressed column: the carrier row holds an encoded payload decoded
    /// one value per row, materialized at `output`.
    Stream { output: usize },
    /// Batch metadata: the declared row count governing batch exhaustion.
    RowCount,
    /// Batch metadata consumed by the node below for sorting; no per-row
    /// decode effect here.
    OrderingKey,
    /// Position the planner asked us not to decompress.
    Skip,
}

/// Ordered map from physical compressed-input positions to output row
/// positions (or metadata roles). Built once at open; immutable after.
#[derive(Debug, Clone)]
pub struct DecompressionMap {
    entries: Vec<MapEntry>,
}

impl DecompressionMap {
    pub fn new(entries: Vec<MapEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }
}

impl From<Vec<MapEntry>> for DecompressionMap {
    fn from(entries: Vec<MapEntry>) -> Self {
        Self::new(entries)
    }
}

/// One column of the decoded output row.
#[derive(Debug, Clone)]
pub struct OutputColumn {
    pub name: String,
    pub data_type: DataType,
    /// Value a compressed column decodes to when its payload is absent for
    /// an entire batch. Null unless the schema declares otherwise.
    pub default: ScalarValue,
}

impl OutputColumn {
    pub fn new<N: Into<String>>(name: N, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            default: ScalarValue::Null,
        }
    }

    pub fn with_default<V: Into<ScalarValue>>(mut self, default: V) -> Self {
        self.default = default.into();
        self
    }
}

/// Shape of the decoded output row. Output column order follows the
/// decompression map's target positions regardless of physical ingestion
/// order.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    columns: Vec<OutputColumn>,
}

impl OutputSchema {
    pub fn new(columns: Vec<OutputColumn>) -> Self {
        Self { columns }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, pos: usize) -> &OutputColumn {
        &self.columns[pos]
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }
}

/// Everything the planner fixes at open time.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub map: DecompressionMap,
    pub schema: OutputSchema,
    /// Pushed-down ordering keys; only consulted in merge-append mode.
    pub sort_keys: Vec<SortKey>,
    /// When set, segments are each internally sorted by the pushed-down
    /// keys and the operator merge-interleaves all batches to reproduce the
    /// global order.
    pub merge_append: bool,
    /// Traverse per-column decode iterators back to front.
    pub reverse: bool,
    /// Name of the logical source partition, used to rewrite projection
    /// references to the source-identity pseudo-column.
    pub source_label: Option<Arc<str>>,
    pub filter: Option<FilterExpr>,
    pub projection: Option<Vec<OutputExpr>>,
}

impl ScanPlan {
    pub fn new<M: Into<DecompressionMap>>(map: M, schema: OutputSchema) -> Self {
        Self {
            map: map.into(),
            schema,
            sort_keys: Vec::new(),
            merge_append: false,
            reverse: false,
            source_label: None,
            filter: None,
            projection: None,
        }
    }

    pub fn with_merge_append(mut self, sort_keys: Vec<SortKey>) -> Self {
        self.merge_append = true;
        self.sort_keys = sort_keys;
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_source_label<L: Into<Arc<str>>>(mut self, label: L) -> Self {
        self.source_label = Some(label.into());
        self
    }

    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_projection(mut self, projection: Vec<OutputExpr>) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Validate the plan before any batch work. All failures here are
    /// `InvalidScanConfig` and fatal before the first row.
    pub fn validate(&self) -> Result<()> {
        if self.map.entries().is_empty() {
            return Err(Error::InvalidScanConfig(
                "no columns specified to decompress".into(),
            ));
        }

        let width = self.schema.width();
        let mut outputs: FxHashSet<usize> = FxHashSet::default();
        let mut row_counts = 0usize;
        for entry in self.map.entries() {
            let output = match entry {
                MapEntry::Segment { output } | MapEntry::Stream { output } => *output,
                MapEntry::RowCount => {
                    row_counts += 1;
                    continue;
                }
                MapEntry::OrderingKey | MapEntry::Skip => continue,
            };
            if output >= width {
                return Err(Error::InvalidScanConfig(format!(
                    "decompression map targets output column {output} but the output row has {width} columns"
                )));
            }
            if !outputs.insert(output) {
                return Err(Error::InvalidScanConfig(format!(
                    "decompression map targets output column {output} twice"
                )));
            }
        }
        if outputs.is_empty() {
            return Err(Error::InvalidScanConfig(
                "decompression map materializes no output columns".into(),
            ));
        }
        if row_counts != 1 {
            return Err(Error::InvalidScanConfig(format!(
                "decompression map must carry exactly one row-count column, found {row_counts}"
            )));
        }

        // Sort keys travel with merge mode only, and merge mode needs them.
        if self.merge_append && self.sort_keys.is_empty() {
            return Err(Error::InvalidScanConfig(
                "merge append requested without sort keys".into(),
            ));
        }
        if !self.merge_append && !self.sort_keys.is_empty() {
            return Err(Error::InvalidScanConfig(
                "sort keys are only valid with merge append".into(),
            ));
        }
        for key in &self.sort_keys {
            if !outputs.contains(&key.column) {
                return Err(Error::InvalidScanConfig(format!(
                    "sort key references output column {} which is not materialized",
                    key.column
                )));
            }
        }

        if let Some(filter) = &self.filter {
            filter.validate_columns(width)?;
        }
        if let Some(projection) = &self.projection {
            for expr in projection {
                if let OutputExpr::Column(column) = expr {
                    if *column >= width {
                        return Err(Error::InvalidScanConfig(format!(
                            "projection references output column {column} but the output row has {width} columns"
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_col_schema() -> OutputSchema {
        OutputSchema::new(vec![
            OutputColumn::new("device", DataType::Int64),
            OutputColumn::new("reading", DataType::Float64),
        ])
    }

    #[test]
    fn valid_plan_passes() {
        let plan = ScanPlan::new(
            vec![
                MapEntry::Segment { output: 0 },
                MapEntry::Stream { output: 1 },
                MapEntry::RowCount,
            ],
            two_col_schema(),
        );
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn empty_map_rejected() {
        let plan = ScanPlan::new(Vec::new(), two_col_schema());
        assert!(matches!(
            plan.validate(),
            Err(Error::InvalidScanConfig(_))
        ));
    }

    #[test]
    fn missing_row_count_rejected() {
        let plan = ScanPlan::new(vec![MapEntry::Stream { output: 0 }], two_col_schema());
        assert!(plan.validate().is_err());
    }

    #[test]
    fn duplicate_output_rejected() {
        let plan = ScanPlan::new(
            vec![
                MapEntry::Stream { output: 0 },
                MapEntry::Segment { output: 0 },
                MapEntry::RowCount,
            ],
            two_col_schema(),
        );
        assert!(plan.validate().is_err());
    }

    #[test]
    fn sort_keys_without_merge_rejected() {
        let mut plan = ScanPlan::new(
            vec![MapEntry::Stream { output: 0 }, MapEntry::RowCount],
            two_col_schema(),
        );
        plan.sort_keys = vec![SortKey::ascending(0)];
        assert!(plan.validate().is_err());
    }

    #[test]
    fn merge_without_sort_keys_rejected() {
        let plan = ScanPlan::new(
            vec![MapEntry::Stream { output: 0 }, MapEntry::RowCount],
            two_col_schema(),
        )
        .with_merge_append(Vec::new());
        assert!(plan.validate().is_err());
    }

    #[test]
    fn sort_key_must_be_materialized() {
        let plan = ScanPlan::new(
            vec![MapEntry::Stream { output: 0 }, MapEntry::RowCount],
            two_col_schema(),
        )
        .with_merge_append(vec![SortKey::ascending(1)]);
        assert!(plan.validate().is_err());
    }
}
