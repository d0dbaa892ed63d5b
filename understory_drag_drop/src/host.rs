// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The session owner: applies queued messages and drives preview and targets.
//!
//! [`DragDrop`] lives at the root of the UI tree, on the thread that owns UI state.
//! It is the only writer of the drag session. Everything else talks to it through
//! a [`DragHandle`] (directly or via a [`DragSource`]) and observes it read-only.
//!
//! ## Workflow
//!
//! 1) Create the owner and register drop targets. Registration (and every later
//!    [`DragDrop::layout_changed`]) queues a [`MeasureRequest`].
//! 2) Hand [`DragDrop::take_measure_requests`] to the platform's layout facility;
//!    it answers by posting [`DragMessage::TargetMeasured`] /
//!    [`DragMessage::PreviewMeasured`] through a handle.
//! 3) Create sources with [`DragDrop::source`] and feed them gesture events, on any
//!    thread.
//! 4) Call [`DragDrop::pump`] once per frame on the owner's thread. Each applied
//!    drag command updates the session, notifies subscribers, renders the preview,
//!    and (for releases) evaluates the drop targets.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Rect};
//! use understory_drag_drop::command::DragMessage;
//! use understory_drag_drop::config::DragDropConfig;
//! use understory_drag_drop::host::DragDrop;
//! use understory_drag_drop::measure::MeasureSubject;
//! use understory_drag_drop::source::GestureEvent;
//!
//! let color = Rc::new(RefCell::new("white"));
//! let sink = Rc::clone(&color);
//!
//! let mut dnd = DragDrop::new(DragDropConfig::default());
//! let target = dnd.register_target(move |c: &&'static str| *sink.borrow_mut() = *c);
//!
//! // The platform measures the target and answers through a handle.
//! let handle = dnd.handle();
//! for req in dnd.take_measure_requests() {
//!     if req.subject == MeasureSubject::Target(target) {
//!         let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
//!         handle.send(DragMessage::TargetMeasured { target, ticket: req.ticket, bounds }).unwrap();
//!     }
//! }
//!
//! let mut red = dnd.source("red");
//! red.handle_gesture(GestureEvent::Down(Point::new(300.0, 50.0))).unwrap();
//! red.handle_gesture(GestureEvent::Move(Point::new(120.0, 50.0))).unwrap();
//! red.handle_gesture(GestureEvent::Up(Point::new(50.0, 50.0))).unwrap();
//!
//! let report = dnd.pump();
//! assert_eq!(report.deliveries.len(), 1);
//! assert_eq!(*color.borrow(), "red");
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use std::sync::mpsc::Receiver;

use smallvec::SmallVec;

use crate::command::{DragCommand, DragMessage};
use crate::config::DragDropConfig;
use crate::handle::{self, DragHandle};
use crate::measure::{MeasureRequest, MeasureSubject, MeasureTicket};
use crate::preview::{DragPreview, PreviewFrame, PreviewSurface};
use crate::session::{DragStore, Session, SessionChange, SubscriptionId};
use crate::source::{DragSource, SourceId};
use crate::target::{DropTargets, TargetId};

/// A drop accepted by a target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Delivery {
    /// The accepting target.
    pub target: TargetId,
    /// Sequence number of the release that was delivered.
    pub release: u64,
}

/// Summary of applied messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DragReport {
    /// Messages that changed the session, a target, or the preview.
    pub applied: usize,
    /// Messages that were ignored (out of order, superseded, or stale).
    pub ignored: usize,
    /// Drops accepted by targets, in order.
    pub deliveries: SmallVec<[Delivery; 1]>,
}

impl DragReport {
    fn merge(&mut self, other: Self) {
        self.applied += other.applied;
        self.ignored += other.ignored;
        self.deliveries.extend(other.deliveries);
    }

    fn applied() -> Self {
        Self {
            applied: 1,
            ..Self::default()
        }
    }

    fn ignored() -> Self {
        Self {
            ignored: 1,
            ..Self::default()
        }
    }
}

/// Root-owned coordinator of one drag-and-drop interaction space.
pub struct DragDrop<P> {
    config: DragDropConfig,
    store: DragStore<P>,
    targets: DropTargets<P>,
    preview: DragPreview,
    surface: Option<Box<dyn PreviewSurface>>,
    handle: DragHandle<P>,
    inbox: Receiver<DragMessage<P>>,
    requests: Vec<MeasureRequest>,
    next_source: u64,
    next_ticket: u64,
}

impl<P> DragDrop<P> {
    /// Creates an owner with an idle session, no targets, and no preview surface.
    #[must_use]
    pub fn new(config: DragDropConfig) -> Self {
        let (handle, inbox) = handle::channel();
        Self {
            config,
            store: DragStore::new(),
            targets: DropTargets::new()
                .with_policy(config.overlap)
                .with_staleness_window(config.staleness_window),
            preview: DragPreview::new(),
            surface: None,
            handle,
            inbox,
            requests: Vec::new(),
            next_source: 0,
            next_ticket: 0,
        }
    }

    /// A new handle for posting messages to this owner.
    #[must_use]
    pub fn handle(&self) -> DragHandle<P> {
        self.handle.clone()
    }

    /// Current session snapshot.
    #[must_use]
    pub fn session(&self) -> &Session<P> {
        self.store.session()
    }

    /// Session revision; see [`DragStore::revision`].
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Registers a read-only observer of session changes.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&Session<P>, SessionChange) + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    /// Removes an observer.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Registers a drop target that calls `on_drop` with the payload of accepted drops.
    ///
    /// Queues a measurement request for the new target.
    pub fn register_target(&mut self, on_drop: impl FnMut(&P) + 'static) -> TargetId {
        self.insert_target(Some(Box::new(on_drop)))
    }

    /// Registers a drop target without a callback; it still takes part in hit testing.
    pub fn register_passive_target(&mut self) -> TargetId {
        self.insert_target(None)
    }

    fn insert_target(&mut self, on_drop: Option<Box<dyn FnMut(&P)>>) -> TargetId {
        let seen = self.store.session().release().map(|r| r.seq);
        let id = self.targets.register(on_drop, seen);
        self.layout_changed(id);
        id
    }

    /// Removes a target; late measurement answers for it are dropped.
    pub fn unregister_target(&mut self, id: TargetId) -> bool {
        self.requests
            .retain(|req| req.subject != MeasureSubject::Target(id));
        self.targets.unregister(id)
    }

    /// Queues a measurement request after the target's layout changed.
    ///
    /// Returns `None` for unknown targets.
    pub fn layout_changed(&mut self, id: TargetId) -> Option<MeasureTicket> {
        let ticket = self.alloc_ticket();
        let ticket = self.targets.request_measurement(id, ticket)?;
        self.requests.push(MeasureRequest {
            subject: MeasureSubject::Target(id),
            ticket,
        });
        Some(ticket)
    }

    /// The registered drop targets.
    #[must_use]
    pub fn targets(&self) -> &DropTargets<P> {
        &self.targets
    }

    /// The preview state.
    #[must_use]
    pub fn preview(&self) -> &DragPreview {
        &self.preview
    }

    /// Marks the preview content as changed; its size is measured on the next show.
    pub fn preview_content_changed(&mut self) {
        self.preview.content_changed();
    }

    /// Sets the overlay that draws the preview.
    pub fn set_preview_surface(&mut self, surface: impl PreviewSurface + 'static) {
        self.surface = Some(Box::new(surface));
    }

    /// Drains the queued measurement requests for the platform.
    pub fn take_measure_requests(&mut self) -> Vec<MeasureRequest> {
        core::mem::take(&mut self.requests)
    }

    /// Applies every message currently queued, in arrival order.
    ///
    /// Messages posted by callbacks while pumping are applied in the same call.
    pub fn pump(&mut self) -> DragReport {
        let mut report = DragReport::default();
        while let Ok(message) = self.inbox.try_recv() {
            report.merge(self.apply(message));
        }
        report
    }

    /// Applies one message immediately, bypassing the queue.
    pub fn apply(&mut self, message: DragMessage<P>) -> DragReport {
        match message {
            DragMessage::Drag { source, command } => self.apply_command(source, command),
            DragMessage::TargetMeasured {
                target,
                ticket,
                bounds,
            } => {
                if self.targets.complete_measurement(target, ticket, bounds) {
                    DragReport::applied()
                } else {
                    DragReport::ignored()
                }
            }
            DragMessage::PreviewMeasured { ticket, size } => {
                if !self.preview.set_size(ticket, size) {
                    return DragReport::ignored();
                }
                if let Some(frame) = self.preview.refresh(self.store.session()) {
                    self.render(frame);
                }
                DragReport::applied()
            }
        }
    }

    fn apply_command(&mut self, source: SourceId, command: DragCommand<P>) -> DragReport {
        log::trace!("applying {} from {source:?}", command_name(&command));
        let change = match command {
            DragCommand::Start(payload) => {
                self.store.start_drag(source, payload);
                SessionChange::Started
            }
            DragCommand::Move(position) => {
                if !self.store.update_live_position(source, position) {
                    return DragReport::ignored();
                }
                SessionChange::Moved
            }
            DragCommand::End(position) => {
                if !self.store.end_drag(source, position) {
                    return DragReport::ignored();
                }
                SessionChange::Released
            }
        };

        if let Some(frame) = self.preview.observe(self.store.session(), change) {
            self.render(frame);
            if matches!(frame, PreviewFrame::Shown { .. }) && self.preview.needs_measurement() {
                let ticket = self.alloc_ticket();
                let ticket = self.preview.request_measurement(ticket);
                self.requests.push(MeasureRequest {
                    subject: MeasureSubject::Preview,
                    ticket,
                });
            }
        }

        let mut report = DragReport::applied();
        if change == SessionChange::Released {
            let session = self.store.session();
            let release = session.release().map_or(0, |r| r.seq);
            report.deliveries = self
                .targets
                .evaluate(session)
                .into_iter()
                .map(|target| Delivery { target, release })
                .collect();
        }
        report
    }

    fn render(&mut self, frame: PreviewFrame) {
        let Some(surface) = &mut self.surface else {
            return;
        };
        match frame {
            PreviewFrame::Hidden => surface.hide(),
            PreviewFrame::Shown { origin, .. } => surface.show(origin),
        }
    }

    fn alloc_ticket(&mut self) -> MeasureTicket {
        self.next_ticket += 1;
        MeasureTicket::new(self.next_ticket)
    }
}

impl<P: Clone> DragDrop<P> {
    /// Creates a draggable source carrying `payload`, wired to this owner.
    ///
    /// The source uses the configured activation distance and may be moved to the
    /// gesture thread when `P: Send`.
    pub fn source(&mut self, payload: P) -> DragSource<P> {
        self.next_source += 1;
        DragSource::new(SourceId::new(self.next_source), payload, self.handle())
            .with_activation_distance(self.config.activation_distance)
    }
}

fn command_name<P>(command: &DragCommand<P>) -> &'static str {
    match command {
        DragCommand::Start(_) => "start",
        DragCommand::Move(_) => "move",
        DragCommand::End(_) => "end",
    }
}

impl<P: fmt::Debug> fmt::Debug for DragDrop<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDrop")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("targets", &self.targets)
            .field("preview", &self.preview)
            .field("surface", &self.surface.is_some())
            .field("pending_requests", &self.requests.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;
    use crate::source::GestureEvent;
    use kurbo::{Point, Rect, Size};

    #[derive(Default)]
    struct Recorder {
        frames: Rc<RefCell<Vec<Option<Point>>>>,
    }

    impl PreviewSurface for Recorder {
        fn show(&mut self, origin: Point) {
            self.frames.borrow_mut().push(Some(origin));
        }

        fn hide(&mut self) {
            self.frames.borrow_mut().push(None);
        }
    }

    fn measure_all(dnd: &mut DragDrop<&'static str>, bounds: &[(TargetId, Rect)], preview: Size) {
        for req in dnd.take_measure_requests() {
            let msg = match req.subject {
                MeasureSubject::Target(id) => {
                    let (_, rect) = bounds
                        .iter()
                        .find(|(t, _)| *t == id)
                        .expect("bounds for every registered target");
                    DragMessage::TargetMeasured {
                        target: id,
                        ticket: req.ticket,
                        bounds: *rect,
                    }
                }
                MeasureSubject::Preview => DragMessage::PreviewMeasured {
                    ticket: req.ticket,
                    size: preview,
                },
            };
            dnd.apply(msg);
        }
    }

    fn drag(source: SourceId, command: DragCommand<&'static str>) -> DragMessage<&'static str> {
        DragMessage::Drag { source, command }
    }

    #[test]
    fn registration_queues_measurement() {
        let mut dnd = DragDrop::<u8>::new(DragDropConfig::default());
        let a = dnd.register_target(|_| {});
        let b = dnd.register_passive_target();

        let subjects: Vec<_> = dnd
            .take_measure_requests()
            .into_iter()
            .map(|r| r.subject)
            .collect();
        assert_eq!(subjects, [MeasureSubject::Target(a), MeasureSubject::Target(b)]);
        assert!(dnd.take_measure_requests().is_empty(), "requests are drained");
    }

    #[test]
    fn release_is_delivered_with_payload() {
        let got = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&got);
        let mut dnd = DragDrop::new(DragDropConfig::default());
        let t = dnd.register_target(move |p: &&'static str| sink.borrow_mut().push(*p));
        measure_all(&mut dnd, &[(t, Rect::new(100.0, 100.0, 200.0, 200.0))], Size::ZERO);

        let s = SourceId::new(1);
        dnd.apply(drag(s, DragCommand::Start("red")));
        dnd.apply(drag(s, DragCommand::Move(Point::new(150.0, 150.0))));
        let report = dnd.apply(drag(s, DragCommand::End(Point::new(150.0, 150.0))));

        assert_eq!(
            report.deliveries.as_slice(),
            &[Delivery {
                target: t,
                release: 1
            }]
        );
        assert_eq!(*got.borrow(), ["red"]);
        assert!(!dnd.session().is_active(), "session ends on release");
    }

    #[test]
    fn out_of_order_commands_are_ignored() {
        let mut dnd = DragDrop::<&'static str>::new(DragDropConfig::default());
        let s = SourceId::new(1);
        let report = dnd.apply(drag(s, DragCommand::End(Point::ZERO)));
        assert_eq!(report.ignored, 1);
        let report = dnd.apply(drag(s, DragCommand::Move(Point::ZERO)));
        assert_eq!(report.ignored, 1);
        assert_eq!(dnd.revision(), 0);
    }

    #[test]
    fn preview_follows_and_recenters() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let mut dnd = DragDrop::new(DragDropConfig::default());
        dnd.set_preview_surface(Recorder {
            frames: Rc::clone(&frames),
        });

        let s = SourceId::new(1);
        dnd.apply(drag(s, DragCommand::Start("red")));
        dnd.apply(drag(s, DragCommand::Move(Point::new(50.0, 50.0))));
        measure_all(&mut dnd, &[], Size::new(20.0, 20.0));
        dnd.apply(drag(s, DragCommand::Move(Point::new(60.0, 60.0))));
        dnd.apply(drag(s, DragCommand::End(Point::new(60.0, 60.0))));

        assert_eq!(
            *frames.borrow(),
            [
                Some(Point::new(50.0, 50.0)),
                Some(Point::new(40.0, 40.0)),
                Some(Point::new(50.0, 50.0)),
                None,
            ]
        );
    }

    #[test]
    fn second_drag_starts_at_its_own_pointer() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let mut dnd = DragDrop::new(DragDropConfig::default());
        dnd.set_preview_surface(Recorder {
            frames: Rc::clone(&frames),
        });

        let s = SourceId::new(1);
        dnd.apply(drag(s, DragCommand::Start("red")));
        dnd.apply(drag(s, DragCommand::Move(Point::new(310.0, 300.0))));
        measure_all(&mut dnd, &[], Size::ZERO);
        dnd.apply(drag(s, DragCommand::End(Point::new(310.0, 300.0))));
        frames.borrow_mut().clear();

        dnd.apply(drag(s, DragCommand::Start("blue")));
        assert!(frames.borrow().is_empty(), "start alone draws nothing");
        dnd.apply(drag(s, DragCommand::Move(Point::new(310.0, 500.0))));
        assert_eq!(*frames.borrow(), [Some(Point::new(310.0, 500.0))]);
        assert!(
            dnd.take_measure_requests().is_empty(),
            "size already known, no new preview request"
        );
    }

    #[test]
    fn unregistered_target_drops_pending_requests() {
        let mut dnd = DragDrop::<u8>::new(DragDropConfig::default());
        let t = dnd.register_target(|_| {});
        assert!(dnd.unregister_target(t));
        assert!(dnd.take_measure_requests().is_empty(), "request for removed target dropped");
        assert_eq!(dnd.layout_changed(t), None);
    }

    #[test]
    fn pump_applies_callback_posted_messages() {
        let mut dnd = DragDrop::<u8>::new(DragDropConfig::default());
        let relay = dnd.handle();
        let t = dnd.register_target(move |p| {
            // Chain a second drag from inside the drop callback.
            relay
                .send_command(SourceId::new(2), DragCommand::Start(*p + 1))
                .unwrap();
        });
        for req in dnd.take_measure_requests() {
            dnd.apply(DragMessage::TargetMeasured {
                target: t,
                ticket: req.ticket,
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            });
        }

        let h = dnd.handle();
        h.send_command(SourceId::new(1), DragCommand::Start(1)).unwrap();
        h.send_command(SourceId::new(1), DragCommand::End(Point::new(5.0, 5.0)))
            .unwrap();

        let report = dnd.pump();
        assert_eq!(report.applied, 3);
        assert_eq!(report.deliveries.len(), 1);
        assert_eq!(dnd.session().payload(), Some(&2));
        assert!(dnd.session().is_active(), "chained drag is running");
    }

    #[test]
    fn sources_get_distinct_ids_and_configured_distance() {
        let mut dnd = DragDrop::new(DragDropConfig::default().with_activation_distance(5.0));
        let mut a = dnd.source("a");
        let b = dnd.source("b");
        assert_ne!(a.id(), b.id());

        assert!(a.map(GestureEvent::Down(Point::ZERO)).is_empty());
        assert!(
            a.map(GestureEvent::Move(Point::new(3.0, 4.0))).is_empty(),
            "a move of exactly 5.0 stays below the activation distance"
        );
        assert_eq!(
            a.map(GestureEvent::Move(Point::new(6.0, 0.0))).as_slice(),
            &[DragCommand::Start("a"), DragCommand::Move(Point::new(6.0, 0.0))]
        );
    }
}
