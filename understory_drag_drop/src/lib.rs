// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Drag Drop: drag-and-drop coordination for UI.
//!
//! A drag moves a payload from a *source* widget to a *target* widget. This crate
//! keeps the shared state of that interaction and the rules around it, without
//! assuming any particular UI framework or renderer:
//!
//! - [`session`]: the single drag session (payload, live pointer position, release)
//!   and its change notifications
//! - [`source`]: per-widget gesture mapping from raw pointer events to drag commands
//! - [`handle`] / [`command`]: message passing from gesture threads to the owner
//! - [`measure`]: asynchronous layout measurement as request/response tickets
//! - [`target`]: cached target bounds, the release hit test, and drop delivery
//! - [`preview`]: placement of the floating preview under the pointer
//! - [`host`]: [`DragDrop`](host::DragDrop), the owner tying it all together
//! - [`config`]: activation distance, overlap policy, and measurement staleness
//!
//! ## Threading
//!
//! Gesture recognizers may run off the UI thread. They never touch the session
//! directly: a [`DragSource`](source::DragSource) posts [`DragCommand`](command::DragCommand)s
//! through a cloneable [`DragHandle`](handle::DragHandle), and the owner applies
//! them in arrival order when it is pumped. Subscribers and drop callbacks run on
//! the owner's thread.
//!
//! ## Usage
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Rect, Size};
//! use understory_drag_drop::command::DragMessage;
//! use understory_drag_drop::config::DragDropConfig;
//! use understory_drag_drop::host::DragDrop;
//! use understory_drag_drop::measure::MeasureSubject;
//! use understory_drag_drop::source::GestureEvent;
//!
//! let background = Rc::new(RefCell::new("white"));
//! let sink = Rc::clone(&background);
//!
//! let mut dnd = DragDrop::new(DragDropConfig::default());
//! let target = dnd.register_target(move |color: &&'static str| *sink.borrow_mut() = *color);
//! let mut blue = dnd.source("blue");
//!
//! // Answer measurement requests as the platform's layout pass would.
//! let answer = |dnd: &mut DragDrop<&'static str>| {
//!     let handle = dnd.handle();
//!     for req in dnd.take_measure_requests() {
//!         let msg = match req.subject {
//!             MeasureSubject::Target(target) => DragMessage::TargetMeasured {
//!                 target,
//!                 ticket: req.ticket,
//!                 bounds: Rect::new(0.0, 400.0, 100.0, 500.0),
//!             },
//!             MeasureSubject::Preview => DragMessage::PreviewMeasured {
//!                 ticket: req.ticket,
//!                 size: Size::new(100.0, 100.0),
//!             },
//!         };
//!         handle.send(msg).unwrap();
//!     }
//!     dnd.pump();
//! };
//! answer(&mut dnd);
//!
//! blue.handle_gesture(GestureEvent::Down(Point::new(150.0, 50.0))).unwrap();
//! blue.handle_gesture(GestureEvent::Move(Point::new(100.0, 200.0))).unwrap();
//! dnd.pump();
//! answer(&mut dnd);
//! assert_eq!(dnd.preview().content_size(), Some(Size::new(100.0, 100.0)));
//!
//! blue.handle_gesture(GestureEvent::Up(Point::new(50.0, 450.0))).unwrap();
//! let report = dnd.pump();
//! assert_eq!(report.deliveries[0].target, target);
//! assert_eq!(*background.borrow(), "blue");
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwarded to `kurbo`.
//! - `libm`: forwarded to `kurbo` for float math without `std`.
//!
//! The crate itself always uses `std`, for its message channel.

extern crate alloc;

pub mod command;
pub mod config;
pub mod handle;
pub mod host;
pub mod measure;
pub mod preview;
pub mod session;
pub mod source;
pub mod target;
