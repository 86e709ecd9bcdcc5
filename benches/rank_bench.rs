use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use procscope::rank::{SortKey, rank, top_unique_by_memory};
use procscope::system::derive::{CounterTable, ProcessCounters, derive};
use procscope::system::platform::IoStats;
use procscope::system::process::{MemoryStats, ProcessRecord, RawProcess};
use procscope::system::snapshot::RawSample;

fn make_records(n: usize) -> Vec<ProcessRecord> {
    (0..n)
        .map(|i| ProcessRecord {
            memory_mb: ((i * 7919) % 4096) as f64,
            cpu_percent: ((i * 31) % 100) as f64,
            disk_read_delta: (i % 13) as f64 * 4.5,
            disk_write_delta: (i % 17) as f64 * 2.25,
            priority: Some((i % 40) as i32 - 20),
            ..ProcessRecord::new(i as u32 + 1, format!("proc_{}", i % 250))
        })
        .collect()
}

fn make_raw(n: usize, taken_at: Instant, step: u64) -> RawSample {
    let processes = (0..n)
        .map(|i| RawProcess {
            pid: i as u32 + 1,
            name: format!("proc_{i}"),
            memory_bytes: (i as u64 + 1) * 1024 * 1024,
            cpu_time_ms: (i as u64 + 1) * step,
            io: Some(IoStats {
                read_bytes: (i as u64) * step * 512,
                write_bytes: (i as u64) * step * 256,
            }),
            priority: Some(0),
        })
        .collect();
    RawSample {
        taken_at,
        processes,
        memory: MemoryStats::default(),
        issues: Vec::new(),
    }
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let records = make_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let ranked = rank(black_box(records), SortKey::Cpu, true, "");
                black_box(ranked);
            })
        });
    }

    group.finish();
}

fn bench_rank_filtered_by_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_name_filtered_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let records = make_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let ranked = rank(black_box(records), SortKey::Name, false, "proc_1");
                black_box(ranked);
            })
        });
    }

    group.finish();
}

fn bench_top_unique(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_unique_by_memory_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let records = make_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(top_unique_by_memory(black_box(records), 5)))
        });
    }

    group.finish();
}

fn bench_derive(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let start = Instant::now();
        let previous = make_raw(size, start, 10);
        let previous = CounterTable::from_counters(
            start,
            previous
                .processes
                .iter()
                .map(|p| (p.pid, ProcessCounters::from(p))),
        );
        let current = make_raw(size, start + Duration::from_secs(1), 20);

        group.bench_with_input(BenchmarkId::from_parameter(size), &current, |b, current| {
            b.iter(|| black_box(derive(black_box(current), &previous, 8)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rank,
    bench_rank_filtered_by_name,
    bench_top_unique,
    bench_derive
);
criterion_main!(benches);
