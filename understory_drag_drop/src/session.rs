// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction state store: the single drag session and its observers.
//!
//! ## Usage
//!
//! 1) Begin a session with [`DragStore::start_drag`], attaching the payload.
//! 2) Stream pointer positions with [`DragStore::update_live_position`].
//! 3) Finish with [`DragStore::end_drag`], which records the release position.
//!
//! Every applied mutation synchronously notifies all observers registered with
//! [`DragStore::subscribe`], passing the full [`Session`] snapshot and the kind of
//! change. Calls that do not apply (moving or ending without an active session,
//! or from a source that no longer owns the session) are ignored and notify no one.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_drag_drop::session::DragStore;
//! use understory_drag_drop::source::SourceId;
//!
//! let red = SourceId::new(1);
//! let mut store = DragStore::new();
//!
//! store.start_drag(red, "red");
//! assert!(store.session().is_active());
//!
//! assert!(store.update_live_position(red, Point::new(40.0, 60.0)));
//! assert!(store.end_drag(red, Point::new(42.0, 61.0)));
//!
//! let session = store.session();
//! assert!(!session.is_active());
//! // The payload stays readable for hit tests evaluated after the release.
//! assert_eq!(session.payload(), Some(&"red"));
//! assert_eq!(session.release().map(|r| r.position), Some(Point::new(42.0, 61.0)));
//! ```

use alloc::boxed::Box;
use core::fmt;

use kurbo::Point;
use smallvec::SmallVec;

use crate::source::SourceId;

/// A completed drag's release point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Release {
    /// Absolute screen position where the pointer was released.
    pub position: Point,
    /// Sequence number of this release, starting at `1` for the first completed drag.
    ///
    /// Two releases at the same coordinates still carry distinct sequence numbers,
    /// which is how drop targets evaluate each release exactly once.
    pub seq: u64,
}

/// Snapshot of the shared drag session.
#[derive(Clone, Debug, PartialEq)]
pub struct Session<P> {
    payload: Option<P>,
    source: Option<SourceId>,
    active: bool,
    live_position: Point,
    release: Option<Release>,
}

impl<P> Session<P> {
    const fn new() -> Self {
        Self {
            payload: None,
            source: None,
            active: false,
            live_position: Point::ZERO,
            release: None,
        }
    }

    /// The payload of the current or most recent drag.
    ///
    /// It survives [`DragStore::end_drag`] and is only replaced by the next start.
    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// The source that started the current or most recent drag.
    #[must_use]
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Last pointer position streamed by the dragging source.
    #[must_use]
    pub fn live_position(&self) -> Point {
        self.live_position
    }

    /// The most recent release, if any drag has completed.
    #[must_use]
    pub fn release(&self) -> Option<Release> {
        self.release
    }
}

impl<P> Default for Session<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// What an applied mutation did to the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SessionChange {
    /// A drag started (possibly replacing an unfinished one).
    Started,
    /// The live position moved.
    Moved,
    /// The drag ended and a new [`Release`] was recorded.
    Released,
}

/// Handle returned by [`DragStore::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Observer<P> = Box<dyn FnMut(&Session<P>, SessionChange)>;

/// Owner of the drag [`Session`].
///
/// There is exactly one writer (whoever holds `&mut DragStore`) and any number of
/// read-only observers.
pub struct DragStore<P> {
    session: Session<P>,
    observers: SmallVec<[(SubscriptionId, Observer<P>); 4]>,
    next_subscription: u64,
    revision: u64,
}

impl<P> DragStore<P> {
    /// Creates a store with an idle session and no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            observers: SmallVec::new(),
            next_subscription: 0,
            revision: 0,
        }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn session(&self) -> &Session<P> {
        &self.session
    }

    /// Counter bumped once per applied mutation. Ignored calls leave it unchanged.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Begins a session owned by `source`, carrying `payload`.
    ///
    /// Any unfinished session is overwritten; its payload is dropped and it never
    /// produces a release. The live position keeps its current value until the
    /// source streams a new one.
    pub fn start_drag(&mut self, source: SourceId, payload: P) {
        if self.session.active {
            log::debug!(
                "drag from {source:?} replaces unfinished drag from {:?}",
                self.session.source
            );
        } else {
            log::debug!("drag started by {source:?}");
        }
        self.session.payload = Some(payload);
        self.session.source = Some(source);
        self.session.active = true;
        self.commit(SessionChange::Started);
    }

    /// Overwrites the live position of the active session.
    ///
    /// Returns `false` (and does nothing) when no session is active or when
    /// `source` does not own it.
    pub fn update_live_position(&mut self, source: SourceId, position: Point) -> bool {
        if !self.owns_active(source) {
            log::trace!("ignoring move from {source:?}: not the active source");
            return false;
        }
        self.session.live_position = position;
        self.commit(SessionChange::Moved);
        true
    }

    /// Ends the active session at `position`.
    ///
    /// The payload is retained so that observers evaluating a hit test after this
    /// call can still read it. Returns `false` (and does nothing) when no session is
    /// active or when `source` does not own it.
    pub fn end_drag(&mut self, source: SourceId, position: Point) -> bool {
        if !self.owns_active(source) {
            log::debug!("ignoring end from {source:?}: no matching active drag");
            return false;
        }
        let seq = self.session.release.map_or(1, |r| r.seq + 1);
        self.session.release = Some(Release { position, seq });
        self.session.active = false;
        log::debug!("drag from {source:?} released at {position:?} (release #{seq})");
        self.commit(SessionChange::Released);
        true
    }

    /// Registers an observer called after every applied mutation.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&Session<P>, SessionChange) + 'static,
    ) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn owns_active(&self, source: SourceId) -> bool {
        self.session.active && self.session.source == Some(source)
    }

    fn commit(&mut self, change: SessionChange) {
        self.revision = self.revision.wrapping_add(1);
        debug_assert!(
            !self.session.active || self.session.payload.is_some(),
            "an active session always carries a payload"
        );
        for (_, observer) in &mut self.observers {
            observer(&self.session, change);
        }
    }
}

impl<P> Default for DragStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: fmt::Debug> fmt::Debug for DragStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragStore")
            .field("session", &self.session)
            .field("observers", &self.observers.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
