//! Bench single-stream and heap-merged drains over synthetic batches.

#![forbid(unsafe_code)]

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use strata_decompress::{
    CompressedBatch, DecompressScan, MapEntry, OutputColumn, OutputSchema, ScanPlan,
};
use strata_test_utils::{PlainCodec, VecScan, int_batch};
use strata_types::{DataType, ScalarValue, SortKey};

const BATCHES: usize = 64;
const ROWS_PER_BATCH: usize = 1_000;

fn int_plan() -> ScanPlan {
    ScanPlan::new(
        vec![MapEntry::Stream { output: 0 }, MapEntry::RowCount],
        OutputSchema::new(vec![OutputColumn::new("ts", DataType::Int64)]),
    )
}

fn make_sorted_batches(n: usize, rows: usize) -> Vec<CompressedBatch> {
    let mut rng = SmallRng::seed_from_u64(0xDECA_F000_0000_0017);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let mut run: Vec<i64> = (0..rows).map(|_| rng.random_range(0..1_000_000)).collect();
        run.sort_unstable();
        out.push(int_batch(&run));
    }
    out
}

fn drain(mut scan: DecompressScan<VecScan, PlainCodec>) -> u64 {
    let mut acc = 0u64;
    loop {
        match scan.next().expect("drain") {
            Some(row) => {
                if let ScalarValue::Int(v) = row[0] {
                    acc = acc.wrapping_add(v as u64);
                }
            }
            None => break,
        }
    }
    acc
}

fn bench_decompress(c: &mut Criterion) {
    let batches = make_sorted_batches(BATCHES, ROWS_PER_BATCH);

    c.bench_function("decompress/single_stream_drain", |b| {
        b.iter_batched(
            || {
                DecompressScan::open(int_plan(), VecScan::new(batches.clone()), PlainCodec)
                    .expect("open")
            },
            |scan| black_box(drain(scan)),
            BatchSize::PerIteration,
        );
    });

    c.bench_function("decompress/merge_append_drain", |b| {
        b.iter_batched(
            || {
                let plan = int_plan().with_merge_append(vec![SortKey::ascending(0)]);
                DecompressScan::open(plan, VecScan::new(batches.clone()), PlainCodec)
                    .expect("open")
            },
            |scan| black_box(drain(scan)),
            BatchSize::PerIteration,
        );
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_decompress
}
criterion_main!(benches);
