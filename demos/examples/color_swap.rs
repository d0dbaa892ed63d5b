// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color swap.
//!
//! Three colored swatches on the right, three white drop boxes on the left.
//! Dragging a swatch onto a box paints the box in the swatch's color. Gestures
//! are recognized on a separate thread and posted to the session owner, which
//! is pumped once per frame on the main thread.
//!
//! Run:
//! - `cargo run -p understory_demos --example color_swap`

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;

use kurbo::Point;
use understory_demos::{drop_box, layout_pass, swatch};
use understory_drag_drop::config::DragDropConfig;
use understory_drag_drop::host::DragDrop;
use understory_drag_drop::preview::PreviewSurface;
use understory_drag_drop::source::{DragSource, GestureEvent};

#[derive(Debug)]
struct Overlay;

impl PreviewSurface for Overlay {
    fn show(&mut self, origin: Point) {
        println!("  preview at ({:.0}, {:.0})", origin.x, origin.y);
    }

    fn hide(&mut self) {
        println!("  preview hidden");
    }
}

/// A straight-line drag from `from` to `to`, in `steps` moves.
fn stroke(from: Point, to: Point, steps: u32) -> Vec<GestureEvent> {
    let mut events = vec![GestureEvent::Down(from)];
    for i in 1..=steps {
        events.push(GestureEvent::Move(from.lerp(to, f64::from(i) / f64::from(steps))));
    }
    events.push(GestureEvent::Up(to));
    events
}

/// Replays `events` on a recognizer thread and hands the source back.
fn recognize(
    mut source: DragSource<&'static str>,
    events: Vec<GestureEvent>,
) -> DragSource<&'static str> {
    thread::spawn(move || {
        for event in events {
            if let Err(err) = source.handle_gesture(event) {
                eprintln!("gesture dropped: {err}");
            }
        }
        source
    })
    .join()
    .unwrap()
}

fn main() {
    let colors = Rc::new(RefCell::new(["white"; 3]));
    let mut dnd = DragDrop::new(DragDropConfig::default().with_activation_distance(4.0));
    dnd.set_preview_surface(Overlay);

    let targets: Vec<_> = (0..3)
        .map(|row| {
            let colors = Rc::clone(&colors);
            dnd.register_target(move |color: &&'static str| colors.borrow_mut()[row] = *color)
        })
        .collect();
    layout_pass(&mut dnd, &targets).unwrap();
    dnd.pump();

    let mut sources: Vec<_> = ["red", "blue", "green"]
        .into_iter()
        .map(|color| dnd.source(color))
        .collect();

    // (swatch row, drop box row); the last one misses every box.
    let script = [(0, 2), (1, 0), (2, 1), (0, 0)];
    for (i, (from, to)) in script.into_iter().enumerate() {
        let start = swatch(from).center();
        let end = if i == script.len() - 1 {
            Point::new(300.0, 580.0)
        } else {
            drop_box(to).center()
        };
        println!("drag {} from {start:?} to {end:?}", sources[from].payload());

        let source = sources.remove(from);
        let source = recognize(source, stroke(start, end, 4));
        sources.insert(from, source);

        // One frame: apply gestures, then answer layout requests they produced.
        let report = dnd.pump();
        layout_pass(&mut dnd, &targets).unwrap();
        dnd.pump();

        match report.deliveries.first() {
            Some(delivery) => println!("  dropped on {:?}", delivery.target),
            None => println!("  no drop"),
        }
        println!("  boxes: {:?}", colors.borrow());
    }
}
