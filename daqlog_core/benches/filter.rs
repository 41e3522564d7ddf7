use std::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use daqlog_core::CalibrationFilter;

// Synthetic multi-channel trace: slow sine plus white noise
fn synth_trace(channels: usize, n: usize, seed: u32) -> Vec<Vec<f64>> {
    let mut state = seed.max(1);
    let mut next_f64 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    };
    (0..channels)
        .map(|ch| {
            (0..n)
                .map(|i| {
                    let t = i as f64 / 200.0;
                    t.sin() + ch as f64 * 0.5 + (next_f64() * 2.0 - 1.0) * 0.05
                })
                .collect()
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let channels = 4;
    let trace = synth_trace(channels, 2_000, 7);

    c.bench_function("push_then_average_4ch_2k", |b| {
        b.iter_batched(
            || CalibrationFilter::new(channels, Duration::from_secs(5), 100.0),
            |mut f| {
                for i in 0..trace[0].len() {
                    for (ch, samples) in trace.iter().enumerate() {
                        f.push(ch, samples[i]);
                    }
                }
                let mut acc = 0.0;
                for ch in 0..channels {
                    acc += f.average(ch);
                }
                black_box(acc)
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("average_full_window", |b| {
        let mut f = CalibrationFilter::new(1, Duration::from_secs(5), 100.0);
        for &v in &trace[0] {
            f.push(0, v);
        }
        b.iter(|| black_box(f.average(0)));
    });
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
