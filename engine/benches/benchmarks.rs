//! Performance benchmarks for taskflow-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use taskflow_engine::{
    merge_payloads, Conflict, ModifiedStamp, Operation, Priority, Stage, TaskRecord, UpdateOp,
};

fn server_task(id: &str, stamp: u64) -> TaskRecord {
    TaskRecord::new(
        id,
        "proj-1",
        "Benchmark task",
        Stage::InProgress,
        Priority::Medium,
        ModifiedStamp::from_millis(stamp),
    )
}

fn update_op(id: &str, base: u64) -> UpdateOp {
    match Operation::update(
        id,
        json!({"stage": "completed", "priority": "high"}),
        ModifiedStamp::from_millis(base),
    ) {
        Operation::Update(op) => op,
        _ => unreachable!(),
    }
}

fn bench_conflict_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("conflict_detection");

    group.bench_function("detect_no_conflict", |b| {
        let op = update_op("task-1", 2000);
        let server = server_task("task-1", 1000);

        b.iter(|| {
            Conflict::detect(
                "c-1",
                1,
                black_box(&op),
                black_box(&server),
                ModifiedStamp::from_millis(5000),
            )
        })
    });

    group.bench_function("detect_conflict", |b| {
        let op = update_op("task-1", 1000);
        let server = server_task("task-1", 2000);

        b.iter(|| {
            Conflict::detect(
                "c-1",
                1,
                black_box(&op),
                black_box(&server),
                ModifiedStamp::from_millis(5000),
            )
        })
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_payloads");

    for field_count in [4usize, 16, 64] {
        let server: serde_json::Map<String, serde_json::Value> = (0..field_count)
            .map(|i| (format!("field_{}", i), json!(i)))
            .collect();
        let server = serde_json::Value::Object(server);
        let client = json!({"field_0": "changed", "extra": true});

        group.bench_with_input(
            BenchmarkId::from_parameter(field_count),
            &field_count,
            |b, _| b.iter(|| merge_payloads(black_box(&server), black_box(&client))),
        );
    }

    group.finish();
}

fn bench_payload_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_roundtrip");

    group.bench_function("to_payload", |b| {
        let task = server_task("task-1", 1000);
        b.iter(|| black_box(&task).to_payload())
    });

    group.bench_function("from_payload", |b| {
        let payload = server_task("task-1", 1000).to_payload();
        b.iter(|| TaskRecord::from_payload(black_box(&payload)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_conflict_detection,
    bench_merge,
    bench_payload_roundtrip
);
criterion_main!(benches);
