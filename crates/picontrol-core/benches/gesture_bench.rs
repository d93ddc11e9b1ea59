//! Criterion benchmarks for the gesture recognizer.
//!
//! Touch-move callbacks arrive at the display refresh rate (60–120 Hz), so the
//! per-callback cost of the recognizer must stay far below a frame.
//!
//! Run with:
//! ```bash
//! cargo bench --package picontrol-core --bench gesture_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use picontrol_core::gesture::{contact_move, contact_start};
use picontrol_core::{GestureConfig, GestureRecognizer, GestureState, TouchSample};

fn bench_single_move(c: &mut Criterion) {
    let config = GestureConfig::default();
    let state = GestureState {
        last_position: Some((100.0, 100.0)),
        ..GestureState::default()
    };
    let points = [TouchSample::new(103.0, 98.0, 16)];

    c.bench_function("contact_move/one_finger", |b| {
        b.iter(|| contact_move(black_box(&state), black_box(&points), black_box(&config)).unwrap())
    });
}

fn bench_scroll_move(c: &mut Criterion) {
    let config = GestureConfig::default();
    let state = GestureState {
        last_scroll_midpoint_y: Some(200.0),
        ..GestureState::default()
    };
    let points = [TouchSample::new(50.0, 190.0, 16), TouchSample::new(150.0, 200.0, 16)];

    c.bench_function("contact_move/two_fingers", |b| {
        b.iter(|| contact_move(black_box(&state), black_box(&points), black_box(&config)).unwrap())
    });
}

fn bench_double_tap(c: &mut Criterion) {
    let config = GestureConfig::default();
    let state = GestureState {
        last_tap_ms: Some(1_000),
        ..GestureState::default()
    };
    let points = [TouchSample::new(10.0, 10.0, 1_200)];

    c.bench_function("contact_start/double_tap", |b| {
        b.iter(|| contact_start(black_box(&state), black_box(&points), black_box(&config)).unwrap())
    });
}

/// A full drag of `n` samples through the stateful recognizer.
fn bench_drag_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("recognizer_drag");
    for n in [10_usize, 100, 1_000] {
        let samples: Vec<TouchSample> = (0..n)
            .map(|i| TouchSample::new(i as f64 * 1.5, i as f64 * 0.5, i as i64 * 16))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &samples, |b, samples| {
            b.iter(|| {
                let mut pad = GestureRecognizer::default();
                pad.on_contact_start(&samples[..1]);
                let mut emitted = 0;
                for sample in &samples[1..] {
                    emitted += pad.on_contact_move(std::slice::from_ref(sample)).events.len();
                }
                pad.on_contact_end(&[]);
                black_box(emitted)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_move,
    bench_scroll_move,
    bench_double_tap,
    bench_drag_stream
);
criterion_main!(benches);
