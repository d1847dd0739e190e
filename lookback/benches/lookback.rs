//! Microbenchmarks for the look-back hot paths.
//!
//! Measures ring insertion, buffered iteration, and partition merging.
//!
//! Run with: `cargo bench -p lookback`

#![allow(missing_docs, clippy::cast_precision_loss)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lookback::buffer::BufferedSeriesIterator;
use lookback::iterator::{ListSeriesIterator, SeriesIterator};
use lookback::labels::Labels;
use lookback::merge::merge_partitions;
use lookback::ring::SampleRing;
use lookback::sample::Sample;
use lookback::series::{ListSeries, ListSeriesSet, Series, SeriesSet};

/// Scrape interval of the generated series, in milliseconds.
const INTERVAL: i64 = 15_000;

/// Generates `n` samples one scrape interval apart.
fn scrape_samples(n: i64, start: i64) -> Vec<Sample> {
    (0..n)
        .map(|i| Sample::new(start + i * INTERVAL, i as f64))
        .collect()
}

fn bench_ring_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring/add");

    // Window widths of 1m, 5m and 1h at a 15s interval.
    for delta in [60_000_i64, 300_000, 3_600_000] {
        let mut ring = SampleRing::new(delta, 16);
        let mut ts = 0_i64;

        group.bench_with_input(BenchmarkId::from_parameter(delta), &delta, |b, _| {
            b.iter(|| {
                ts += INTERVAL;
                ring.add(black_box(ts), black_box(1.0));
            });
        });
    }

    group.finish();
}

fn bench_buffered_next(c: &mut Criterion) {
    let samples = scrape_samples(10_000, 0);

    c.bench_function("buffered/next_10k", |b| {
        b.iter(|| {
            let mut it =
                BufferedSeriesIterator::new(ListSeriesIterator::new(samples.clone()), 300_000);
            let mut sum = 0.0;
            while it.next() {
                sum += it.at().v;
            }
            black_box(sum)
        });
    });
}

fn bench_buffered_step_eval(c: &mut Criterion) {
    let samples = scrape_samples(10_000, 0);
    let end = samples[samples.len() - 1].t;
    let mut group = c.benchmark_group("buffered/step_eval");

    // Evaluation steps smaller than, equal to, and larger than the window.
    for step in [60_000_i64, 300_000, 1_200_000] {
        group.bench_with_input(BenchmarkId::from_parameter(step), &step, |b, &step| {
            b.iter(|| {
                let mut it =
                    BufferedSeriesIterator::new(ListSeriesIterator::new(samples.clone()), 300_000);
                let mut seen = 0_usize;
                let mut t = 0;
                while t <= end && it.seek(t) {
                    let mut window = it.buffer();
                    while window.next() {
                        seen += 1;
                    }
                    t += step;
                }
                black_box(seen)
            });
        });
    }

    group.finish();
}

fn bench_merge_partitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge/partitions");

    for parts in [2_i64, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &parts| {
            b.iter(|| {
                let sets: Vec<Box<dyn SeriesSet>> = (0..parts)
                    .map(|p| {
                        let series = (0..100)
                            .map(|i| {
                                ListSeries::new(
                                    Labels::from_pairs([("instance", format!("{i:03}"))]),
                                    scrape_samples(10, p * 10 * INTERVAL),
                                )
                            })
                            .collect();
                        Box::new(ListSeriesSet::from_list(series)) as Box<dyn SeriesSet>
                    })
                    .collect();

                let mut n = 0_usize;
                for series in merge_partitions(sets) {
                    let mut it = series.iterator();
                    while it.next() {
                        n += 1;
                    }
                }
                black_box(n)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ring_add,
    bench_buffered_next,
    bench_buffered_step_eval,
    bench_merge_partitions,
);
criterion_main!(benches);
