// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Messages posted to the session owner.

use kurbo::{Point, Rect, Size};

use crate::measure::MeasureTicket;
use crate::source::SourceId;
use crate::target::TargetId;

/// A session transition requested by a [`DragSource`](crate::source::DragSource).
#[derive(Clone, Debug, PartialEq)]
pub enum DragCommand<P> {
    /// Begin a session carrying the payload.
    Start(P),
    /// Update the live position.
    Move(Point),
    /// End the session at the given release position.
    End(Point),
}

/// Everything the session owner consumes from its queue.
#[derive(Clone, Debug, PartialEq)]
pub enum DragMessage<P> {
    /// A drag command from a source.
    Drag {
        /// The source that produced the command.
        source: SourceId,
        /// The command.
        command: DragCommand<P>,
    },
    /// Answer to a drop target's measurement request.
    TargetMeasured {
        /// The measured target.
        target: TargetId,
        /// Ticket of the request being answered.
        ticket: MeasureTicket,
        /// Absolute screen-space bounds of the target's wrapper.
        bounds: Rect,
    },
    /// Answer to the preview's measurement request.
    PreviewMeasured {
        /// Ticket of the request being answered.
        ticket: MeasureTicket,
        /// Laid-out size of the preview content.
        size: Size,
    },
}
