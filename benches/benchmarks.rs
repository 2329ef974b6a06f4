//! Benchmark suite for the planner projections.
//!
//! This module provides performance benchmarks for:
//! - Task filtering
//! - Board construction
//! - Completion statistics
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Save baseline for comparison
//! cargo bench -- --save-baseline main
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use matura_plan::buckets::build_board;
use matura_plan::filter::filter_tasks;
use matura_plan::progress::compute_stats;
use matura_plan::{Action, Dataset, FilterCriteria, MemoryStore, Planner, SlotNames, Store, Subject};
use serde_json::json;

const SUBJECTS: [&str; 5] = ["polski", "angielski", "biologia", "chemia", "fizyka"];

/// Synthetic dataset with `size` tasks of eight items each.
fn synthetic_dataset(size: usize) -> Dataset {
    let tasks: Vec<_> = (0..size)
        .map(|i| {
            json!({
                "id": format!("task-{i}"),
                "subject": SUBJECTS[i % SUBJECTS.len()],
                "section": format!("Section {i}"),
                "items": (0..8).map(|j| format!("item {j} of task {i}")).collect::<Vec<_>>(),
                "month": (i % 12) + 1,
                "tags": if i % 3 == 0 { vec!["powtórka"] } else { vec![] },
                "defaultBucket": format!("w{}", i % 10),
            })
        })
        .collect();
    let weeks: Vec<_> = (0..10)
        .map(|w| json!({"key": format!("w{w}"), "label": format!("Week {w}")}))
        .collect();
    let months: Vec<_> = (1..=12)
        .map(|m| json!({"key": format!("m{m}"), "label": format!("Month {m}")}))
        .collect();

    let document = json!({"tasks": tasks, "weeks": weeks, "monthBuckets": months});
    Dataset::from_json_str(&document.to_string()).unwrap()
}

/// Planner over a memory store with every third item checked.
fn seeded_planner(size: usize) -> Planner<MemoryStore> {
    let mut planner = Planner::open(
        synthetic_dataset(size),
        Store::new(MemoryStore::new()),
        SlotNames::default(),
    )
    .unwrap();
    for i in (0..size).step_by(3) {
        planner
            .dispatch(Action::set_item(format!("task-{i}"), i % 8, true))
            .unwrap();
    }
    planner
}

// ============================================================================
// Filtering
// ============================================================================

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_tasks");
    let criteria = FilterCriteria::all()
        .with_subject(Subject::Chemia)
        .with_query("ITEM 3");

    for size in [100, 1_000, 5_000] {
        let dataset = synthetic_dataset(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &dataset, |b, dataset| {
            b.iter(|| filter_tasks(black_box(&dataset.tasks), black_box(&criteria)).count());
        });
    }

    group.finish();
}

// ============================================================================
// Board
// ============================================================================

fn bench_board(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_board");
    let criteria = FilterCriteria::all();

    for size in [100, 1_000, 5_000] {
        let planner = seeded_planner(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &planner, |b, planner| {
            b.iter(|| {
                build_board(
                    black_box(planner.dataset()),
                    black_box(&criteria),
                    black_box(&planner.snapshot().buckets),
                )
                .len()
            });
        });
    }

    group.finish();
}

// ============================================================================
// Statistics
// ============================================================================

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_stats");
    let criteria = FilterCriteria::all();

    for size in [100, 1_000, 5_000] {
        let planner = seeded_planner(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &planner, |b, planner| {
            b.iter(|| {
                compute_stats(
                    black_box(&planner.dataset().tasks),
                    black_box(&criteria),
                    black_box(&planner.snapshot().progress),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_board, bench_stats);
criterion_main!(benches);
