//! Benchmarks for command execution and undo throughput.
//!
//! Run with: cargo bench -p rewind-core --bench manager_bench

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rewind_core::{CommandManager, FnCommand, ManagerConfig, property, shared};

#[derive(Default)]
struct Doc {
    zoom: u64,
    title: String,
}

fn quiet() -> CommandManager {
    CommandManager::new(ManagerConfig::new("bench").with_trace_commands(false))
}

fn bench_execute_set_property(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute_set_property");
    for &n in &[10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mgr = quiet();
                let doc = shared(Doc::default());
                for v in 0..n as u64 {
                    mgr.execute_set_property(&doc, property!(Doc, zoom), black_box(v))
                        .unwrap();
                }
                black_box(mgr.count_of_commands_to_undo())
            });
        });
    }
    group.finish();
}

fn bench_execute_then_undo_all(c: &mut Criterion) {
    c.bench_function("execute_then_undo_all_1000", |b| {
        b.iter(|| {
            let mgr = quiet();
            let doc = shared(Doc::default());
            for i in 0..1000u64 {
                mgr.execute_set_property(&doc, property!(Doc, title), format!("t{i}"))
                    .unwrap();
            }
            black_box(mgr.undo_all_commands().unwrap())
        });
    });
}

fn bench_fn_command_push(c: &mut Criterion) {
    c.bench_function("fn_command_push_1000", |b| {
        b.iter(|| {
            let mgr = quiet();
            for _ in 0..1000 {
                mgr.execute_command(FnCommand::new("noop", || Ok(())).with_undo(|| Ok(())))
                    .unwrap();
            }
            mgr.clear();
        });
    });
}

criterion_group!(
    benches,
    bench_execute_set_property,
    bench_execute_then_undo_all,
    bench_fn_command_push
);
criterion_main!(benches);
