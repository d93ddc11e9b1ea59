//! Criterion benchmarks for the JSON frame codec.
//!
//! A single-finger drag produces one `mouse` frame per touch-move callback,
//! so encoding sits on the hottest path of the trackpad.
//!
//! Run with:
//! ```bash
//! cargo bench --package picontrol-core --bench frame_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use picontrol_core::{decode_frame, encode_frame, CommandMessage, CommandParam, InputEvent, KnownCommand, MouseButton};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn input_events() -> Vec<(&'static str, InputEvent)> {
    vec![
        ("MoveIntegral", InputEvent::Move { dx: 4.0, dy: -3.0 }),
        ("MoveFractional", InputEvent::Move { dx: 1.25, dy: -0.5 }),
        ("Scroll", InputEvent::Scroll { dy: 50.0 }),
        (
            "Click",
            InputEvent::Click {
                button: MouseButton::Left,
            },
        ),
        ("Key", InputEvent::Key { key: "Enter".into() }),
    ]
}

fn commands() -> Vec<(&'static str, CommandMessage)> {
    vec![
        (
            "GpioOn",
            CommandMessage::known(KnownCommand::GpioOn, vec![]).expect("gpio_on has a default pin"),
        ),
        ("Ping", CommandMessage::new("ping", vec![])),
        (
            "Mixed",
            CommandMessage::new(
                "custom",
                vec![CommandParam::Integer(7), CommandParam::Float(0.5), "label".into()],
            ),
        ),
    ]
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode_input_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_input_event");
    for (name, event) in input_events() {
        group.bench_with_input(BenchmarkId::new("event", name), &event, |b, event| {
            b.iter(|| encode_frame(black_box(event)).expect("encode must succeed"))
        });
    }
    group.finish();
}

fn bench_encode_command(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_command");
    for (name, msg) in commands() {
        group.bench_with_input(BenchmarkId::new("command", name), &msg, |b, msg| {
            b.iter(|| encode_frame(black_box(msg)).expect("encode must succeed"))
        });
    }
    group.finish();
}

fn bench_decode_input_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_input_event");
    for (name, event) in input_events() {
        let frame = encode_frame(&event).expect("encode must succeed for benchmark setup");
        group.bench_with_input(BenchmarkId::new("event", name), &frame, |b, frame| {
            b.iter(|| decode_frame::<InputEvent>(black_box(frame)).expect("decode must succeed"))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_encode_input_event,
    bench_encode_command,
    bench_decode_input_event
);
criterion_main!(benches);
