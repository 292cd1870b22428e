//! Heap-merged decompression across sorted compressed batches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use strata_decompress::{
    CompressedBatch, DecompressScan, MapEntry, OutputColumn, OutputSchema, ScanPlan,
};
use strata_result::Error;
use strata_test_utils::{
    PlainCodec, VecScan, carrier_row, init_tracing_for_tests, int_batch, stream_cell,
};
use strata_types::{DataType, ScalarValue, SortKey};

/// Single sorted int column merged across batches.
fn merge_plan(key: SortKey) -> ScanPlan {
    ScanPlan::new(
        vec![MapEntry::Stream { output: 0 }, MapEntry::RowCount],
        OutputSchema::new(vec![OutputColumn::new("ts", DataType::Int64)]),
    )
    .with_merge_append(vec![key])
}

fn open(plan: ScanPlan, batches: Vec<CompressedBatch>) -> DecompressScan<VecScan, PlainCodec> {
    init_tracing_for_tests();
    DecompressScan::open(plan, VecScan::new(batches), PlainCodec).unwrap()
}

fn drain(scan: &mut DecompressScan<VecScan, PlainCodec>) -> Vec<ScalarValue> {
    let mut out = Vec::new();
    while let Some(row) = scan.next().unwrap() {
        out.push(row[0].clone());
    }
    out
}

fn ints(values: &[i64]) -> Vec<ScalarValue> {
    values.iter().map(|v| ScalarValue::Int(*v)).collect()
}

#[test]
fn merges_single_row_batches_into_global_order() {
    let mut scan = open(
        merge_plan(SortKey::ascending(0)),
        vec![int_batch(&[5]), int_batch(&[1]), int_batch(&[3])],
    );
    assert!(scan.merge_append());
    assert_eq!(drain(&mut scan), ints(&[1, 3, 5]));
    // Exhaustion is terminal.
    assert!(scan.next().unwrap().is_none());
}

#[test]
fn interleaves_multi_row_batches() {
    let mut scan = open(
        merge_plan(SortKey::ascending(0)),
        vec![
            int_batch(&[1, 4, 7]),
            int_batch(&[2, 5, 8]),
            int_batch(&[3, 6, 9]),
        ],
    );
    assert_eq!(drain(&mut scan), ints(&[1, 2, 3, 4, 5, 6, 7, 8, 9]));
}

#[test]
fn pool_grows_past_initial_capacity_without_losing_rows() {
    // More concurrent batches than the pool starts with.
    let mut keys: Vec<i64> = (0..40).collect();
    let mut rng = SmallRng::seed_from_u64(7);
    keys.shuffle(&mut rng);

    let batches: Vec<CompressedBatch> = keys.iter().map(|k| int_batch(&[*k])).collect();
    let mut scan = open(merge_plan(SortKey::ascending(0)), batches);

    let expected: Vec<i64> = (0..40).collect();
    assert_eq!(drain(&mut scan), ints(&expected));
}

#[test]
fn empty_scan_yields_no_rows() {
    let mut scan = open(merge_plan(SortKey::ascending(0)), Vec::new());
    assert!(scan.next().unwrap().is_none());
}

#[test]
fn zero_row_batches_are_released_during_priming() {
    let empty = carrier_row(vec![stream_cell(&[])], 0);
    let mut scan = open(
        merge_plan(SortKey::ascending(0)),
        vec![empty.clone(), int_batch(&[2]), empty, int_batch(&[1])],
    );
    assert_eq!(drain(&mut scan), ints(&[1, 2]));
}

#[test]
fn descending_key_with_nulls_first() {
    // Each batch is internally sorted descending with nulls ahead.
    let b1 = carrier_row(
        vec![stream_cell(&[
            ScalarValue::Null,
            ScalarValue::Int(8),
            ScalarValue::Int(3),
        ])],
        3,
    );
    let b2 = carrier_row(
        vec![stream_cell(&[ScalarValue::Int(9), ScalarValue::Int(4)])],
        2,
    );
    let mut scan = open(merge_plan(SortKey::descending(0)), vec![b1, b2]);
    assert_eq!(
        drain(&mut scan),
        vec![
            ScalarValue::Null,
            ScalarValue::Int(9),
            ScalarValue::Int(8),
            ScalarValue::Int(4),
            ScalarValue::Int(3),
        ]
    );
}

#[test]
fn ascending_key_sorts_nulls_last() {
    let b1 = carrier_row(
        vec![stream_cell(&[ScalarValue::Int(1), ScalarValue::Null])],
        2,
    );
    let b2 = carrier_row(vec![stream_cell(&[ScalarValue::Int(2)])], 1);
    let mut scan = open(merge_plan(SortKey::ascending(0)), vec![b1, b2]);
    assert_eq!(
        drain(&mut scan),
        vec![ScalarValue::Int(1), ScalarValue::Int(2), ScalarValue::Null]
    );
}

#[test]
fn multi_key_merge_orders_by_both_columns() {
    let plan = ScanPlan::new(
        vec![
            MapEntry::Stream { output: 0 },
            MapEntry::Stream { output: 1 },
            MapEntry::RowCount,
        ],
        OutputSchema::new(vec![
            OutputColumn::new("ts", DataType::Int64),
            OutputColumn::new("seq", DataType::Int64),
        ]),
    )
    .with_merge_append(vec![SortKey::ascending(0), SortKey::descending(1)]);

    // (ts, seq) rows per batch, sorted by ts asc then seq desc.
    let b1 = carrier_row(
        vec![
            stream_cell(&[ScalarValue::Int(1), ScalarValue::Int(2)]),
            stream_cell(&[ScalarValue::Int(9), ScalarValue::Int(5)]),
        ],
        2,
    );
    let b2 = carrier_row(
        vec![
            stream_cell(&[ScalarValue::Int(1), ScalarValue::Int(2)]),
            stream_cell(&[ScalarValue::Int(7), ScalarValue::Int(8)]),
        ],
        2,
    );
    let mut scan = open(plan, vec![b1, b2]);

    let mut rows = Vec::new();
    while let Some(row) = scan.next().unwrap() {
        rows.push((row[0].clone(), row[1].clone()));
    }
    assert_eq!(
        rows,
        vec![
            (ScalarValue::Int(1), ScalarValue::Int(9)),
            (ScalarValue::Int(1), ScalarValue::Int(7)),
            (ScalarValue::Int(2), ScalarValue::Int(8)),
            (ScalarValue::Int(2), ScalarValue::Int(5)),
        ]
    );
}

#[test]
fn randomized_runs_merge_to_global_sort() {
    let mut rng = SmallRng::seed_from_u64(0xC0FFEE);

    for _ in 0..20 {
        let run_count = rng.random_range(1..12);
        let mut all = Vec::new();
        let mut batches = Vec::new();
        for _ in 0..run_count {
            let len = rng.random_range(0..16);
            let mut run: Vec<i64> = (0..len).map(|_| rng.random_range(-100..100)).collect();
            run.sort_unstable();
            all.extend_from_slice(&run);
            batches.push(int_batch(&run));
        }
        batches.shuffle(&mut rng);
        all.sort_unstable();

        let mut scan = open(merge_plan(SortKey::ascending(0)), batches);
        assert_eq!(drain(&mut scan), ints(&all));
    }
}

#[test]
fn rescan_reproduces_identical_sequence() {
    let mut scan = open(
        merge_plan(SortKey::ascending(0)),
        vec![int_batch(&[2, 6]), int_batch(&[1, 9]), int_batch(&[4])],
    );
    let first = drain(&mut scan);
    scan.rescan().unwrap();
    let second = drain(&mut scan);
    assert_eq!(first, second);
    assert_eq!(first, ints(&[1, 2, 4, 6, 9]));
}

#[test]
fn abort_flag_cancels_priming() {
    let flag = Arc::new(AtomicBool::new(true));
    let mut scan = open(merge_plan(SortKey::ascending(0)), vec![int_batch(&[1])])
        .with_abort_flag(Arc::clone(&flag));
    assert!(matches!(scan.next().unwrap_err(), Error::Cancelled));
}

#[test]
fn count_mismatch_surfaces_during_priming() {
    // Declared one row, encoded two.
    let bad = carrier_row(
        vec![stream_cell(&[ScalarValue::Int(1), ScalarValue::Int(2)])],
        1,
    );
    let mut scan = open(merge_plan(SortKey::ascending(0)), vec![bad]);
    // The first advance during priming succeeds; the overflow is caught
    // when the batch is stepped past its declared count.
    let mut saw_err = false;
    loop {
        match scan.next() {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(err) => {
                assert!(matches!(err, Error::CorruptData(_)));
                saw_err = true;
                break;
            }
        }
    }
    assert!(saw_err);
}

#[test]
fn merge_without_sort_keys_fails_open() {
    let plan = ScanPlan::new(
        vec![MapEntry::Stream { output: 0 }, MapEntry::RowCount],
        OutputSchema::new(vec![OutputColumn::new("ts", DataType::Int64)]),
    )
    .with_merge_append(Vec::new());
    let err = DecompressScan::open(plan, VecScan::new(Vec::new()), PlainCodec).unwrap_err();
    assert!(matches!(err, Error::InvalidScanConfig(_)));
}
