use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use hostwatch::filter::filter_processes;
use hostwatch::system::cpu::CpuEstimator;
use hostwatch::system::records::{CpuTimes, ProcessRecord};

fn synthetic_processes(count: u32) -> Vec<ProcessRecord> {
    (0..count)
        .map(|pid| ProcessRecord {
            pid,
            ppid: pid / 4,
            name: format!("worker-{:04}", pid % 500),
            exe_path: format!("/usr/libexec/worker-{}", pid % 500),
            command_line: format!("worker-{} --shard {}", pid % 500, pid),
            started_at: 1_700_000_000 + pid as u64,
            memory_bytes: 1024 * (pid as u64 % 8192),
            kernel_time_ms: pid as u64 * 7,
            user_time_ms: pid as u64 * 13,
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let records = synthetic_processes(5_000);

    c.bench_function("filter_processes_name_5000", |b| {
        b.iter(|| filter_processes(black_box(&records), black_box("worker-04")))
    });

    c.bench_function("filter_processes_pid_5000", |b| {
        b.iter(|| filter_processes(black_box(&records), black_box("42")))
    });

    c.bench_function("filter_processes_empty_5000", |b| {
        b.iter(|| filter_processes(black_box(&records), black_box("")))
    });
}

fn bench_estimator(c: &mut Criterion) {
    c.bench_function("cpu_estimator_sample", |b| {
        let mut estimator = CpuEstimator::new();
        let mut tick = 0u64;
        b.iter(|| {
            tick += 100;
            black_box(estimator.sample(CpuTimes {
                idle: tick * 3,
                kernel: tick,
                user: tick * 2,
            }))
        })
    });
}

criterion_group!(benches, bench_filter, bench_estimator);
criterion_main!(benches);
