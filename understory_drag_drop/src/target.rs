// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop targets: cached screen bounds and the release hit test.
//!
//! ## Usage
//!
//! 1) Register a target with an optional acceptance callback.
//! 2) On every layout change, request a measurement and feed the answer back with
//!    [`DropTargets::complete_measurement`]. Until the first answer arrives, the
//!    target treats every release as a miss.
//! 3) After each session change, call [`DropTargets::evaluate`]. For each *new*
//!    release, every target tests the release point against its bounds (all four
//!    edges inclusive) and the winning target's callback receives the payload
//!    exactly once.
//!
//! ## Overlapping targets
//!
//! A release on an edge shared by two adjacent targets hits both. With
//! [`OverlapPolicy::FirstRegistered`] (the default) only the earliest registered
//! target accepts it; [`OverlapPolicy::All`] delivers it to every target hit.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Rect};
//! use understory_drag_drop::measure::MeasureTicket;
//! use understory_drag_drop::session::DragStore;
//! use understory_drag_drop::source::SourceId;
//! use understory_drag_drop::target::DropTargets;
//!
//! let received = Rc::new(Cell::new(None));
//! let sink = Rc::clone(&received);
//!
//! let mut targets = DropTargets::<&'static str>::new();
//! let id = targets.register(Some(Box::new(move |color: &&'static str| sink.set(Some(*color)))), None);
//! let ticket = targets.request_measurement(id, MeasureTicket::new(1)).unwrap();
//! targets.complete_measurement(id, ticket, Rect::new(100.0, 100.0, 200.0, 200.0));
//!
//! let mut store = DragStore::new();
//! let source = SourceId::new(1);
//! store.start_drag(source, "red");
//! store.end_drag(source, Point::new(150.0, 150.0));
//!
//! let accepted = targets.evaluate(store.session());
//! assert_eq!(accepted.as_slice(), &[id]);
//! assert_eq!(received.get(), Some("red"));
//!
//! // The same release is never delivered twice.
//! assert!(targets.evaluate(store.session()).is_empty());
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::measure::{MeasureSlot, MeasureTicket};
use crate::session::Session;

/// Identifier for a registered drop target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Acceptance callback invoked with the dragged payload.
pub type DropCallback<P> = Box<dyn FnMut(&P)>;

/// Inclusive point-in-rectangle test.
///
/// Points on any of the four edges are inside. The rectangle is normalized first,
/// so bounds with negative width or height behave like their positive counterpart.
#[must_use]
pub fn hit_test(bounds: Rect, point: Point) -> bool {
    let r = bounds.abs();
    point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
}

/// Which targets receive a release that lands in more than one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlapPolicy {
    /// Only the earliest registered target that was hit accepts the drop.
    #[default]
    FirstRegistered,
    /// Every target that was hit accepts the drop.
    All,
}

/// Result of evaluating one target against the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropOutcome {
    /// No drag has been released yet.
    Idle,
    /// The latest release was already evaluated.
    AlreadySeen,
    /// The target has no usable bounds; treated as a miss.
    Unmeasured,
    /// The session carries no payload; treated as a miss.
    NoPayload,
    /// The release point is outside the bounds.
    Miss,
    /// The release point is inside the bounds and the target accepted the drop.
    Hit,
    /// The release point is inside the bounds but an earlier target accepted the drop.
    Claimed,
}

/// A drop region with its cached bounds and acceptance callback.
pub struct DropTarget<P> {
    id: TargetId,
    bounds: MeasureSlot<Rect>,
    on_drop: Option<DropCallback<P>>,
    last_release: Option<u64>,
}

impl<P> DropTarget<P> {
    /// Creates a target that ignores every release up to and including `seen_release`.
    #[must_use]
    pub fn new(id: TargetId, on_drop: Option<DropCallback<P>>, seen_release: Option<u64>) -> Self {
        Self {
            id,
            bounds: MeasureSlot::new(),
            on_drop,
            last_release: seen_release,
        }
    }

    /// This target's identifier.
    #[must_use]
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Most recently measured bounds, regardless of staleness.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds.get().copied()
    }

    /// Returns `true` if the target has an acceptance callback.
    #[must_use]
    pub fn accepts_drops(&self) -> bool {
        self.on_drop.is_some()
    }

    /// Records a measurement request for a layout change.
    pub fn request_measurement(&mut self, ticket: MeasureTicket) -> MeasureTicket {
        self.bounds.request(ticket)
    }

    /// Applies a measurement answer. Returns `false` if it was out of date.
    pub fn complete_measurement(&mut self, ticket: MeasureTicket, bounds: Rect) -> bool {
        self.bounds.complete(ticket, bounds)
    }

    /// Tests the latest release against the bounds without firing the callback.
    ///
    /// The release is marked as seen, so it is evaluated only once. `window` bounds
    /// how stale the cached measurement may be (`None` means unlimited).
    pub fn check(&mut self, session: &Session<P>, window: Option<u64>) -> DropOutcome {
        let Some(release) = session.release() else {
            return DropOutcome::Idle;
        };
        if self.last_release == Some(release.seq) {
            return DropOutcome::AlreadySeen;
        }
        self.last_release = Some(release.seq);

        let Some(bounds) = self.bounds.get_within(window) else {
            return DropOutcome::Unmeasured;
        };
        if session.payload().is_none() {
            return DropOutcome::NoPayload;
        }
        if hit_test(*bounds, release.position) {
            DropOutcome::Hit
        } else {
            DropOutcome::Miss
        }
    }

    /// Invokes the acceptance callback, if any.
    pub fn accept(&mut self, payload: &P) {
        if let Some(on_drop) = &mut self.on_drop {
            on_drop(payload);
        }
    }
}

impl<P> fmt::Debug for DropTarget<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropTarget")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("on_drop", &self.on_drop.is_some())
            .field("last_release", &self.last_release)
            .finish()
    }
}

/// Drop targets accepted by one release; almost always zero or one.
pub type Accepted = SmallVec<[TargetId; 1]>;

/// Registration-ordered set of drop targets.
pub struct DropTargets<P> {
    targets: Vec<DropTarget<P>>,
    index: HashMap<TargetId, usize>,
    next_id: u64,
    policy: OverlapPolicy,
    staleness_window: Option<u64>,
}

impl<P> DropTargets<P> {
    /// Creates an empty registry with the default policy and no staleness limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            index: HashMap::new(),
            next_id: 0,
            policy: OverlapPolicy::default(),
            staleness_window: None,
        }
    }

    /// Sets the overlap policy.
    #[must_use]
    pub fn with_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets how many newer measurement requests a cached bound may lag behind and
    /// still count for hit testing (`None` means unlimited).
    #[must_use]
    pub fn with_staleness_window(mut self, window: Option<u64>) -> Self {
        self.staleness_window = window;
        self
    }

    /// Registers a target after all existing ones.
    ///
    /// `seen_release` is the sequence number of the session's latest release; the
    /// new target never evaluates that release or any earlier one.
    pub fn register(
        &mut self,
        on_drop: Option<DropCallback<P>>,
        seen_release: Option<u64>,
    ) -> TargetId {
        self.next_id += 1;
        let id = TargetId(self.next_id);
        self.index.insert(id, self.targets.len());
        self.targets.push(DropTarget::new(id, on_drop, seen_release));
        id
    }

    /// Removes a target. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: TargetId) -> bool {
        let Some(idx) = self.index.remove(&id) else {
            return false;
        };
        self.targets.remove(idx);
        for (slot, target) in self.targets.iter().enumerate().skip(idx) {
            self.index.insert(target.id, slot);
        }
        true
    }

    /// Looks up a target.
    #[must_use]
    pub fn get(&self, id: TargetId) -> Option<&DropTarget<P>> {
        self.index.get(&id).map(|&idx| &self.targets[idx])
    }

    fn get_mut(&mut self, id: TargetId) -> Option<&mut DropTarget<P>> {
        self.index.get(&id).map(|&idx| &mut self.targets[idx])
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if no targets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Records a measurement request for `id`. Returns `None` for unknown targets.
    pub fn request_measurement(
        &mut self,
        id: TargetId,
        ticket: MeasureTicket,
    ) -> Option<MeasureTicket> {
        self.get_mut(id)
            .map(|target| target.request_measurement(ticket))
    }

    /// Applies a measurement answer for `id`.
    ///
    /// Returns `false` for unknown (possibly unregistered) targets and for answers
    /// that are out of date.
    pub fn complete_measurement(&mut self, id: TargetId, ticket: MeasureTicket, bounds: Rect) -> bool {
        let Some(target) = self.get_mut(id) else {
            log::debug!("measurement for unknown target {id:?} dropped");
            return false;
        };
        let applied = target.complete_measurement(ticket, bounds);
        if applied {
            log::trace!("target {id:?} measured at {bounds:?}");
        } else {
            log::debug!("stale measurement {ticket:?} for target {id:?} ignored");
        }
        applied
    }

    /// Evaluates the session's latest release against every target.
    ///
    /// Returns the targets that accepted the drop; their callbacks have been invoked.
    /// A release is evaluated once per target, so calling this after every session
    /// change is safe.
    pub fn evaluate(&mut self, session: &Session<P>) -> Accepted {
        let mut accepted = Accepted::new();
        let window = self.staleness_window;
        for target in &mut self.targets {
            let mut outcome = target.check(session, window);
            if outcome == DropOutcome::Hit
                && self.policy == OverlapPolicy::FirstRegistered
                && !accepted.is_empty()
            {
                outcome = DropOutcome::Claimed;
            }
            match outcome {
                DropOutcome::Hit => {
                    if let Some(payload) = session.payload() {
                        target.accept(payload);
                    }
                    log::debug!("drop accepted by {:?}", target.id);
                    accepted.push(target.id);
                }
                DropOutcome::Claimed => {
                    log::debug!("{:?} hit but drop already claimed", target.id);
                }
                DropOutcome::Unmeasured => {
                    log::debug!("{:?} not measured yet, release treated as a miss", target.id);
                }
                DropOutcome::Idle
                | DropOutcome::AlreadySeen
                | DropOutcome::NoPayload
                | DropOutcome::Miss => {}
            }
        }
        accepted
    }
}

impl<P> Default for DropTargets<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for DropTargets<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropTargets")
            .field("targets", &self.targets)
            .field("policy", &self.policy)
            .field("staleness_window", &self.staleness_window)
            .finish_non_exhaustive()
    }
}
