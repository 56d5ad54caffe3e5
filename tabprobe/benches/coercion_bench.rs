use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::sync::Arc;
use tabprobe::core::{
    join_and, to_condition_operand, to_display_value, ColumnType, ConditionTree, Value,
};
use tabprobe::prelude::{ColumnInfo, InMemoryRequestor, ProbeSession, SessionConfig};

fn sample_cells(n: usize) -> Vec<(Value, ColumnType)> {
    (0..n)
        .map(|i| match i % 6 {
            0 => (json!(i), ColumnType::Integer),
            1 => (json!(format!("site-{i}")), ColumnType::String),
            2 => (json!(45_000.0 + i as f64 / 96.0), ColumnType::DateTime),
            3 => (json!(i as f64 / 1440.0), ColumnType::Duration),
            4 => (
                json!({"latitude": 59.9, "longitude": 10.75, "elevation": i}),
                ColumnType::Geo,
            ),
            _ => (json!(i % 2), ColumnType::Bool),
        })
        .collect()
}

fn benchmark_display_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("display_values");

    for n in [100, 1_000, 10_000].iter() {
        let cells = sample_cells(*n);
        group.throughput(Throughput::Elements(*n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &cells, |b, cells| {
            b.iter(|| {
                cells
                    .iter()
                    .map(|(value, ty)| to_display_value(std::hint::black_box(value), ty))
                    .count()
            });
        });
    }

    group.finish();
}

fn benchmark_condition_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition_building");

    for n in [4, 16, 64].iter() {
        let cells = sample_cells(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &cells, |b, cells| {
            b.iter(|| {
                let leaves: Vec<ConditionTree> = cells
                    .iter()
                    .enumerate()
                    .map(|(i, (value, ty))| {
                        to_condition_operand(std::hint::black_box(value), Some(ty))
                            .into_leaf(format!("col{i}"))
                            .into()
                    })
                    .collect();
                join_and(leaves)
            });
        });
    }

    group.finish();
}

fn benchmark_session_filter(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let rows: Vec<Vec<Value>> = (0..10_000)
        .map(|i| vec![json!(format!("site-{}", i % 50)), json!(i)])
        .collect();
    let requestor = InMemoryRequestor::new(
        vec![
            ColumnInfo::new(0, "Site", ColumnType::String),
            ColumnInfo::new(1, "Depth", ColumnType::Integer),
        ],
        rows,
    );

    c.bench_function("session_filter_10k", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut session =
                    ProbeSession::new(Arc::new(requestor.clone()), SessionConfig::default());
                session.load().await.unwrap();
                session.apply_filter("site-7").await.unwrap();
                session.values().len()
            })
        });
    });
}

criterion_group!(
    benches,
    benchmark_display_values,
    benchmark_condition_building,
    benchmark_session_filter
);
criterion_main!(benches);
