use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hostvitals::{cpu_load_between, format_bytes, format_duration, CpuTicks, TempSeverity};

/// Benchmark byte formatting across unit magnitudes
fn bench_format_bytes(c: &mut Criterion) {
    let samples: [i64; 6] = [
        -1,
        512,
        1024,
        5 * 1024 * 1024,
        3 * 1024 * 1024 * 1024,
        i64::MAX,
    ];

    c.bench_function("format_bytes", |b| {
        b.iter(|| {
            for sample in samples {
                black_box(format_bytes(black_box(sample)));
            }
        })
    });
}

/// Benchmark duration decomposition
fn bench_format_duration(c: &mut Criterion) {
    c.bench_function("format_duration", |b| {
        b.iter(|| black_box(format_duration(black_box(123_456_789))))
    });
}

/// Benchmark CPU load derivation from tick deltas
fn bench_cpu_load(c: &mut Criterion) {
    let prev = CpuTicks {
        user: 4_705,
        nice: 150,
        system: 1_120,
        idle: 1_434_136,
        iowait: 1_974,
        softirq: 155,
        ..CpuTicks::default()
    };
    let cur = CpuTicks {
        user: 4_965,
        nice: 150,
        system: 1_180,
        idle: 1_434_836,
        iowait: 1_990,
        softirq: 158,
        ..CpuTicks::default()
    };

    c.bench_function("cpu_load_between", |b| {
        b.iter(|| black_box(cpu_load_between(black_box(&prev), black_box(&cur))))
    });
}

/// Benchmark temperature classification
fn bench_classify_temperature(c: &mut Criterion) {
    c.bench_function("classify_temperature", |b| {
        b.iter(|| {
            for temp in [-5.0_f32, 35.0, 61.0, 95.0] {
                black_box(TempSeverity::classify(black_box(temp)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_format_bytes,
    bench_format_duration,
    bench_cpu_load,
    bench_classify_temperature
);
criterion_main!(benches);
