//! Insertion benchmarks for the packed row-store sub-block.
//!
//! Measures single-tuple insertion against the bulk paths (identity,
//! remapped, and partial) from a row-store source, which exercise the
//! compiled run programs instead of per-attribute writes.
//!
//! ```bash
//! cargo bench --bench bulk_insert
//! cargo bench --bench bulk_insert -- single   # Only single-tuple inserts
//! cargo bench --bench bulk_insert -- bulk     # Only bulk paths
//! ```

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use packrow::{
    AttributeDef, DataType, PackedRowStoreSubBlock, RelationSchema, SubBlockKind, Tuple,
    TupleStoreDescription, Value,
};

const REGION_SIZE: usize = 64 * 1024;
const ROWS: usize = 1_000;

fn packed() -> TupleStoreDescription {
    TupleStoreDescription {
        kind: SubBlockKind::PackedRowStore,
    }
}

fn bench_schema() -> RelationSchema {
    RelationSchema::new(vec![
        AttributeDef::new("id", DataType::Int8),
        AttributeDef::new("count", DataType::Int4),
        AttributeDef::nullable("score", DataType::Float8),
        AttributeDef::new("day", DataType::Date),
    ])
}

fn sample_tuple(i: usize) -> Tuple {
    let score = if i % 7 == 0 {
        Value::Null
    } else {
        Value::Float8(i as f64 * 0.5)
    };
    Tuple::new([
        Value::Int8(i as i64),
        Value::Int4((i * 3) as i32),
        score,
        Value::Date(i as i32),
    ])
}

fn populated_source(schema: &RelationSchema, region: &mut [u8]) -> usize {
    let mut block = PackedRowStoreSubBlock::new(schema, &packed(), true, region).unwrap();
    let mut inserted = 0;
    for i in 0..ROWS {
        if block.insert_tuple(&sample_tuple(i)).id.is_none() {
            break;
        }
        inserted += 1;
    }
    inserted
}

fn bench_single_insert(c: &mut Criterion) {
    let schema = bench_schema();
    let mut group = c.benchmark_group("single_insert");
    group.throughput(Throughput::Elements(ROWS as u64));

    group.bench_function("insert_tuple_1k", |b| {
        let tuples: Vec<Tuple> = (0..ROWS).map(sample_tuple).collect();
        let mut region = vec![0u8; REGION_SIZE];
        b.iter(|| {
            let mut block =
                PackedRowStoreSubBlock::new(&schema, &packed(), true, &mut region).unwrap();
            for tuple in &tuples {
                black_box(block.insert_tuple(tuple));
            }
        });
    });

    group.finish();
}

fn bench_bulk_insert(c: &mut Criterion) {
    let schema = bench_schema();
    let mut src_region = vec![0u8; REGION_SIZE];
    let rows = populated_source(&schema, &mut src_region);
    let src = PackedRowStoreSubBlock::new(&schema, &packed(), false, &mut src_region).unwrap();

    let mut group = c.benchmark_group("bulk_insert");
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_function("identity_1k", |b| {
        let mut region = vec![0u8; REGION_SIZE];
        b.iter(|| {
            let mut block =
                PackedRowStoreSubBlock::new(&schema, &packed(), true, &mut region).unwrap();
            let mut accessor = src.value_accessor();
            black_box(block.bulk_insert_tuples(&mut accessor));
        });
    });

    group.bench_function("remapped_1k", |b| {
        let attribute_map = [Some(0), Some(1), Some(2), Some(3)];
        let mut region = vec![0u8; REGION_SIZE];
        b.iter(|| {
            let mut block =
                PackedRowStoreSubBlock::new(&schema, &packed(), true, &mut region).unwrap();
            let mut accessor = src.value_accessor();
            black_box(
                block.bulk_insert_tuples_with_remapped_attributes(&attribute_map, &mut accessor),
            );
        });
    });

    group.bench_function("partial_then_finalize_1k", |b| {
        let attribute_map = [Some(0), Some(1), Some(2), Some(3)];
        let mut region = vec![0u8; REGION_SIZE];
        b.iter(|| {
            let mut block =
                PackedRowStoreSubBlock::new(&schema, &packed(), true, &mut region).unwrap();
            let mut accessor = src.value_accessor();
            let inserted =
                block.bulk_insert_partial_tuples(&attribute_map, &mut accessor, usize::MAX);
            block.bulk_insert_partial_tuples_finalize(inserted);
            black_box(inserted);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_insert, bench_bulk_insert);
criterion_main!(benches);
