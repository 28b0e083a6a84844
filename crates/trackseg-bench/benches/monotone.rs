// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use trackseg_core::{ExecutionContext, Point2, Segmenter};
use trackseg_criteria::{CircularRange, EnclosingBallRadius, MinMaxDifference};
use trackseg_segment::{MonotoneSegmentation, MonotoneSegmentationConfig};

const N: usize = 100_000;

fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

fn unit(state: &mut u64) -> f64 {
    (lcg_next(state) >> 11) as f64 / (1u64 << 53) as f64
}

/// Random walk of speeds with occasional regime jumps.
fn speed_series(n: usize) -> Vec<f64> {
    let mut state = 0x5eed_cafe_u64;
    let mut level = 10.0;
    (0..n)
        .map(|_| {
            if unit(&mut state) < 0.01 {
                level = 5.0 + 30.0 * unit(&mut state);
            }
            level + unit(&mut state)
        })
        .collect()
}

fn heading_series(n: usize) -> Vec<f64> {
    let mut state = 0xbead_u64;
    let mut heading = 90.0;
    (0..n)
        .map(|_| {
            heading = (heading + 10.0 * (unit(&mut state) - 0.5)).rem_euclid(360.0);
            heading
        })
        .collect()
}

fn walk(n: usize) -> Vec<Point2> {
    let mut state = 0xdecaf_u64;
    let (mut x, mut y) = (0.0, 0.0);
    (0..n)
        .map(|_| {
            x += unit(&mut state) - 0.5;
            y += unit(&mut state) - 0.5;
            Point2::new(x, y)
        })
        .collect()
}

fn benchmark_monotone(c: &mut Criterion) {
    let ctx = ExecutionContext::new();
    let speeds = speed_series(N);
    let headings = heading_series(N);
    let points = walk(N);

    let mut group = c.benchmark_group("monotone");

    let by_speed = MonotoneSegmentation::new(
        MinMaxDifference::new(2.0).expect("valid threshold"),
        MonotoneSegmentationConfig::default(),
    )
    .expect("valid config");
    group.bench_function("difference_n1e5", |b| {
        b.iter(|| {
            by_speed
                .segment(black_box(&speeds), black_box(&ctx))
                .expect("difference segmentation should succeed");
        })
    });

    let by_heading = MonotoneSegmentation::new(
        CircularRange::new(45.0).expect("valid threshold"),
        MonotoneSegmentationConfig::default(),
    )
    .expect("valid config");
    group.bench_function("circular_range_n1e5", |b| {
        b.iter(|| {
            by_heading
                .segment(black_box(&headings), black_box(&ctx))
                .expect("circular segmentation should succeed");
        })
    });

    let by_stay = MonotoneSegmentation::new(
        EnclosingBallRadius::new(3.0).expect("valid threshold"),
        MonotoneSegmentationConfig::default(),
    )
    .expect("valid config");
    group.bench_function("enclosing_ball_n1e5", |b| {
        b.iter(|| {
            by_stay
                .segment(black_box(&points), black_box(&ctx))
                .expect("enclosing-ball segmentation should succeed");
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_monotone);
criterion_main!(benches);
