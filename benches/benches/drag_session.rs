// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use kurbo::{Point, Rect};
use understory_drag_drop::command::{DragCommand, DragMessage};
use understory_drag_drop::config::DragDropConfig;
use understory_drag_drop::host::DragDrop;
use understory_drag_drop::measure::MeasureSubject;
use understory_drag_drop::source::SourceId;

const SOURCE: SourceId = SourceId::new(1);

/// An owner with `n` measured targets laid out on a grid of 40x40 cells.
fn grid(n: usize) -> DragDrop<u32> {
    let mut dnd = DragDrop::new(DragDropConfig::default());
    let ids: Vec<_> = (0..n)
        .map(|_| {
            dnd.register_target(|p| {
                black_box(p);
            })
        })
        .collect();
    for req in dnd.take_measure_requests() {
        let MeasureSubject::Target(id) = req.subject else {
            continue;
        };
        let Some(i) = ids.iter().position(|t| *t == id) else {
            continue;
        };
        let (col, row) = ((i % 32) as f64, (i / 32) as f64);
        let bounds = Rect::from_origin_size((col * 40.0, row * 40.0), (40.0, 40.0));
        dnd.apply(DragMessage::TargetMeasured {
            target: id,
            ticket: req.ticket,
            bounds,
        });
    }
    dnd
}

fn drag(command: DragCommand<u32>) -> DragMessage<u32> {
    DragMessage::Drag {
        source: SOURCE,
        command,
    }
}

fn bench_live_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag_session/live_updates");

    // Moves never evaluate targets, so cost should be flat in the target count.
    for targets in [0_usize, 64, 1_024] {
        let moves = 1_000_u32;
        group.throughput(Throughput::Elements(u64::from(moves)));
        group.bench_with_input(BenchmarkId::from_parameter(targets), &targets, |b, &n| {
            b.iter_batched(
                || {
                    let mut dnd = grid(n);
                    dnd.apply(drag(DragCommand::Start(1)));
                    dnd
                },
                |mut dnd| {
                    for i in 0..moves {
                        let p = Point::new(f64::from(i % 800), f64::from(i / 800));
                        black_box(dnd.apply(drag(DragCommand::Move(p))));
                    }
                    dnd
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag_session/release");

    for targets in [16_usize, 256, 4_096] {
        group.throughput(Throughput::Elements(targets as u64));
        group.bench_with_input(BenchmarkId::from_parameter(targets), &targets, |b, &n| {
            b.iter_batched(
                || {
                    let mut dnd = grid(n);
                    dnd.apply(drag(DragCommand::Start(1)));
                    dnd
                },
                |mut dnd| {
                    let report = dnd.apply(drag(DragCommand::End(Point::new(20.0, 20.0))));
                    black_box(report);
                    dnd
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_pump(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag_session/pump");

    for queued in [16_u32, 256] {
        group.throughput(Throughput::Elements(u64::from(queued) + 2));
        group.bench_with_input(BenchmarkId::from_parameter(queued), &queued, |b, &n| {
            b.iter_batched(
                || {
                    let dnd = grid(64);
                    let handle = dnd.handle();
                    handle.send(drag(DragCommand::Start(1))).unwrap();
                    for i in 0..n {
                        let p = Point::new(f64::from(i), 10.0);
                        handle.send(drag(DragCommand::Move(p))).unwrap();
                    }
                    handle.send(drag(DragCommand::End(Point::new(10.0, 10.0)))).unwrap();
                    dnd
                },
                |mut dnd| {
                    black_box(dnd.pump());
                    dnd
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_live_updates, bench_release, bench_pump);
criterion_main!(benches);
