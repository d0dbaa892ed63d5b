// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for hit testing and session ownership.
//!
//! 1. Points inside or on the edge of a rectangle always hit it.
//! 2. Points strictly outside never do.
//! 3. A release inside exactly one target is delivered exactly once.
//! 4. Under arbitrary interleavings of commands from several sources, only the
//!    latest starter owns the session and every accepted release is delivered
//!    exactly when it lands inside the target.

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{Point, Rect};
use proptest::prelude::*;
use understory_drag_drop::command::{DragCommand, DragMessage};
use understory_drag_drop::config::DragDropConfig;
use understory_drag_drop::host::DragDrop;
use understory_drag_drop::source::SourceId;
use understory_drag_drop::target::hit_test;

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-500_i32..500, -500_i32..500, 0_i32..400, 0_i32..400).prop_map(|(x, y, w, h)| {
        Rect::from_origin_size(
            (f64::from(x), f64::from(y)),
            (f64::from(w), f64::from(h)),
        )
    })
}

fn measured(bounds: Rect) -> (DragDrop<u32>, Rc<Cell<u32>>) {
    let drops = Rc::new(Cell::new(0));
    let sink = Rc::clone(&drops);
    let mut dnd = DragDrop::new(DragDropConfig::default());
    let target = dnd.register_target(move |_: &u32| sink.set(sink.get() + 1));
    for req in dnd.take_measure_requests() {
        dnd.apply(DragMessage::TargetMeasured {
            target,
            ticket: req.ticket,
            bounds,
        });
    }
    (dnd, drops)
}

fn release_at(dnd: &mut DragDrop<u32>, at: Point) {
    let source = SourceId::new(1);
    for command in [
        DragCommand::Start(7),
        DragCommand::Move(at),
        DragCommand::End(at),
    ] {
        dnd.apply(DragMessage::Drag { source, command });
    }
}

#[derive(Copy, Clone, Debug)]
enum Op {
    Start(u32),
    Move(u32, Point),
    End(u32, Point),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let point = (-50_i32..150, -50_i32..150).prop_map(|(x, y)| Point::new(f64::from(x), f64::from(y)));
    prop_oneof![
        (1_u32..4).prop_map(Op::Start),
        (1_u32..4, point.clone()).prop_map(|(s, p)| Op::Move(s, p)),
        (1_u32..4, point).prop_map(|(s, p)| Op::End(s, p)),
    ]
}

proptest! {
    #[test]
    fn inside_or_on_edge_always_hits(
        rect in rect_strategy(),
        fx in 0.0_f64..=1.0,
        fy in 0.0_f64..=1.0,
    ) {
        let p = Point::new(rect.x0 + fx * rect.width(), rect.y0 + fy * rect.height());
        prop_assert!(hit_test(rect, p), "{p:?} should hit {rect:?}");
    }

    #[test]
    fn strictly_outside_never_hits(
        rect in rect_strategy(),
        dx in 0.5_f64..100.0,
        side in 0_u8..4,
        f in 0.0_f64..=1.0,
    ) {
        let p = match side {
            0 => Point::new(rect.x0 - dx, rect.y0 + f * rect.height()),
            1 => Point::new(rect.x1 + dx, rect.y0 + f * rect.height()),
            2 => Point::new(rect.x0 + f * rect.width(), rect.y0 - dx),
            _ => Point::new(rect.x0 + f * rect.width(), rect.y1 + dx),
        };
        prop_assert!(!hit_test(rect, p), "{p:?} should miss {rect:?}");
    }

    #[test]
    fn release_inside_is_delivered_exactly_once(
        rect in rect_strategy(),
        fx in 0.0_f64..=1.0,
        fy in 0.0_f64..=1.0,
    ) {
        let (mut dnd, drops) = measured(rect);
        let at = Point::new(rect.x0 + fx * rect.width(), rect.y0 + fy * rect.height());
        release_at(&mut dnd, at);
        prop_assert_eq!(drops.get(), 1);

        // Further notifications never replay the release.
        let report = dnd.pump();
        prop_assert!(report.deliveries.is_empty());
        prop_assert_eq!(drops.get(), 1);
    }

    #[test]
    fn release_outside_is_never_delivered(rect in rect_strategy(), dx in 0.5_f64..100.0) {
        let (mut dnd, drops) = measured(rect);
        release_at(&mut dnd, Point::new(rect.x1 + dx, rect.y1 + dx));
        prop_assert_eq!(drops.get(), 0);
    }

    #[test]
    fn only_the_latest_starter_owns_the_session(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let (mut dnd, drops) = measured(bounds);
        let mut owner: Option<u32> = None;
        let mut expected_drops = 0;
        let mut releases = 0;

        for op in ops {
            let (source, command, accepted) = match op {
                Op::Start(s) => {
                    owner = Some(s);
                    (s, DragCommand::Start(s), true)
                }
                Op::Move(s, p) => (s, DragCommand::Move(p), owner == Some(s)),
                Op::End(s, p) => {
                    let accepted = owner == Some(s);
                    if accepted {
                        owner = None;
                        releases += 1;
                        if hit_test(bounds, p) {
                            expected_drops += 1;
                        }
                    }
                    (s, DragCommand::End(p), accepted)
                }
            };
            let report = dnd.apply(DragMessage::Drag { source: SourceId::new(u64::from(source)), command });
            prop_assert_eq!(report.applied == 1, accepted);

            let session = dnd.session();
            prop_assert_eq!(session.is_active(), owner.is_some());
            if let Some(s) = owner {
                prop_assert_eq!(session.source(), Some(SourceId::new(u64::from(s))));
                prop_assert_eq!(session.payload(), Some(&s));
            }
            prop_assert_eq!(session.release().map_or(0, |r| r.seq), releases);
        }
        prop_assert_eq!(drops.get(), expected_drops);
    }
}
