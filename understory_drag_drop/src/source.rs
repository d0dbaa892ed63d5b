// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draggable source: map raw pointer gestures to drag commands.
//!
//! A [`DragSource`] wraps a fixed payload and runs a small state machine over the
//! gesture events a platform recognizer delivers for one region:
//!
//! | state      | event                          | commands                        | next       |
//! |------------|--------------------------------|---------------------------------|------------|
//! | `Idle`     | `Down(p)`                      |                                 | `Pressed`  |
//! | `Pressed`  | `Move(p)` beyond activation    | `Start(payload)`, `Move(p)`     | `Dragging` |
//! | `Pressed`  | `Up(_)` / `Cancel`             |                                 | `Idle`     |
//! | `Dragging` | `Move(p)`                      | `Move(p)`                       | `Dragging` |
//! | `Dragging` | `Up(p)`                        | `End(p)`                        | `Idle`     |
//! | `Dragging` | `Cancel`                       | `End(last known position)`      | `Idle`     |
//!
//! Positions are absolute screen coordinates, so previews and drop targets can
//! compare them against their own screen-space bounds.
//!
//! The source does not touch the session. It either hands the commands back
//! ([`DragSource::map`]) or posts them to the session owner through its
//! [`DragHandle`] ([`DragSource::handle_gesture`]), which makes it safe to drive
//! from a gesture thread.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_drag_drop::command::DragCommand;
//! use understory_drag_drop::source::{DragSource, GestureEvent, SourceId};
//!
//! let mut source = DragSource::detached(SourceId::new(1), "green");
//!
//! assert!(source.map(GestureEvent::Down(Point::new(10.0, 10.0))).is_empty());
//! let cmds = source.map(GestureEvent::Move(Point::new(14.0, 10.0)));
//! assert_eq!(
//!     cmds.as_slice(),
//!     &[DragCommand::Start("green"), DragCommand::Move(Point::new(14.0, 10.0))]
//! );
//!
//! // A cancelled gesture still ends the drag, at the last known position.
//! let cmds = source.map(GestureEvent::Cancel);
//! assert_eq!(cmds.as_slice(), &[DragCommand::End(Point::new(14.0, 10.0))]);
//! assert!(!source.is_dragging());
//! ```

use core::fmt;

use kurbo::Point;
use smallvec::{SmallVec, smallvec};

use crate::command::DragCommand;
use crate::handle::{DragHandle, HandleError};

/// Identifier for a draggable source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Creates an identifier from a raw value.
    ///
    /// [`DragDrop::source`](crate::host::DragDrop::source) allocates fresh ids; this
    /// is for callers that manage their own.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Raw pointer gesture delivered by the platform recognizer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// Pointer pressed inside the source region.
    Down(Point),
    /// Pointer moved.
    Move(Point),
    /// Pointer released.
    Up(Point),
    /// The system interrupted the gesture.
    Cancel,
}

/// Where a [`DragSource`] is in its gesture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SourcePhase {
    /// No pointer interaction.
    Idle,
    /// Pointer is down but has not moved far enough to start a drag.
    Pressed {
        /// Where the pointer went down.
        origin: Point,
    },
    /// A drag is in progress.
    Dragging {
        /// Most recent pointer position.
        last: Point,
    },
}

/// Commands produced by one gesture event; never more than two.
pub type Commands<P> = SmallVec<[DragCommand<P>; 2]>;

/// A draggable region carrying a payload.
pub struct DragSource<P> {
    id: SourceId,
    payload: P,
    phase: SourcePhase,
    activation_distance: f64,
    handle: Option<DragHandle<P>>,
}

impl<P: Clone> DragSource<P> {
    /// Creates a source that posts its commands through `handle`.
    #[must_use]
    pub fn new(id: SourceId, payload: P, handle: DragHandle<P>) -> Self {
        Self {
            id,
            payload,
            phase: SourcePhase::Idle,
            activation_distance: 0.0,
            handle: Some(handle),
        }
    }

    /// Creates a source with no session owner; only [`DragSource::map`] is useful.
    #[must_use]
    pub fn detached(id: SourceId, payload: P) -> Self {
        Self {
            id,
            payload,
            phase: SourcePhase::Idle,
            activation_distance: 0.0,
            handle: None,
        }
    }

    /// Sets how far the pointer must travel from the press point before a drag starts.
    ///
    /// The default `0.0` starts the drag on the first movement.
    #[must_use]
    pub fn with_activation_distance(mut self, distance: f64) -> Self {
        self.activation_distance = distance.max(0.0);
        self
    }

    /// This source's identifier.
    #[must_use]
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// The payload handed to the session on every drag start.
    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Current gesture phase.
    #[must_use]
    pub fn phase(&self) -> SourcePhase {
        self.phase
    }

    /// Returns `true` while this source is dragging.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, SourcePhase::Dragging { .. })
    }

    /// Last pointer position seen during the current drag.
    #[must_use]
    pub fn last_position(&self) -> Option<Point> {
        match self.phase {
            SourcePhase::Dragging { last } => Some(last),
            _ => None,
        }
    }

    /// Advances the state machine and returns the resulting commands.
    pub fn map(&mut self, event: GestureEvent) -> Commands<P> {
        match (self.phase, event) {
            (SourcePhase::Dragging { last }, GestureEvent::Down(p)) => {
                // The up for the previous drag never arrived.
                self.phase = SourcePhase::Pressed { origin: p };
                smallvec![DragCommand::End(last)]
            }
            (_, GestureEvent::Down(p)) => {
                self.phase = SourcePhase::Pressed { origin: p };
                SmallVec::new()
            }
            (SourcePhase::Pressed { origin }, GestureEvent::Move(p)) => {
                if origin.distance(p) > self.activation_distance {
                    self.phase = SourcePhase::Dragging { last: p };
                    smallvec![DragCommand::Start(self.payload.clone()), DragCommand::Move(p)]
                } else {
                    SmallVec::new()
                }
            }
            (SourcePhase::Dragging { .. }, GestureEvent::Move(p)) => {
                self.phase = SourcePhase::Dragging { last: p };
                smallvec![DragCommand::Move(p)]
            }
            (SourcePhase::Dragging { .. }, GestureEvent::Up(p)) => {
                self.phase = SourcePhase::Idle;
                smallvec![DragCommand::End(p)]
            }
            (SourcePhase::Dragging { last }, GestureEvent::Cancel) => {
                log::debug!("gesture on {:?} cancelled, ending drag at {last:?}", self.id);
                self.phase = SourcePhase::Idle;
                smallvec![DragCommand::End(last)]
            }
            (SourcePhase::Pressed { .. }, GestureEvent::Up(_) | GestureEvent::Cancel) => {
                self.phase = SourcePhase::Idle;
                SmallVec::new()
            }
            (SourcePhase::Idle, _) => SmallVec::new(),
        }
    }

    /// Advances the state machine and posts the resulting commands to the session owner.
    ///
    /// The phase advances even when posting fails. A detached source maps the event
    /// and drops the commands.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> Result<(), HandleError> {
        let commands = self.map(event);
        let Some(handle) = &self.handle else {
            return Ok(());
        };
        for command in commands {
            handle.send_command(self.id, command)?;
        }
        Ok(())
    }
}

impl<P: fmt::Debug> fmt::Debug for DragSource<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragSource")
            .field("id", &self.id)
            .field("payload", &self.payload)
            .field("phase", &self.phase)
            .field("activation_distance", &self.activation_distance)
            .field("attached", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}
