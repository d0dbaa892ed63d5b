// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating drag preview placement.
//!
//! While a drag is active the preview follows the live pointer position, centered
//! on its own measured size so it appears held under the finger. The size is only
//! known after the content has been laid out once, so the first frame of a fresh
//! preview is anchored at its top-left corner and corrected as soon as the
//! measurement arrives.
//!
//! [`DragPreview::observe`] turns session changes into [`PreviewFrame`]s: one
//! `Shown` frame per live-position update, and a single `Hidden` frame when the
//! drag ends. A start on its own draws nothing, and neither does an idle session.
//!
//! ```
//! use kurbo::{Point, Size};
//! use understory_drag_drop::measure::MeasureTicket;
//! use understory_drag_drop::preview::{DragPreview, PreviewFrame};
//! use understory_drag_drop::session::{DragStore, SessionChange};
//! use understory_drag_drop::source::SourceId;
//!
//! let src = SourceId::new(1);
//! let mut store = DragStore::new();
//! let mut preview = DragPreview::new();
//!
//! let ticket = preview.request_measurement(MeasureTicket::new(1));
//! preview.complete_measurement(ticket, Size::new(100.0, 100.0), store.session());
//!
//! store.start_drag(src, "red");
//! assert_eq!(preview.observe(store.session(), SessionChange::Started), None);
//!
//! store.update_live_position(src, Point::new(150.0, 300.0));
//! assert_eq!(
//!     preview.observe(store.session(), SessionChange::Moved),
//!     Some(PreviewFrame::Shown { origin: Point::new(100.0, 250.0), centered: true })
//! );
//!
//! store.end_drag(src, Point::new(150.0, 300.0));
//! assert_eq!(preview.observe(store.session(), SessionChange::Released), Some(PreviewFrame::Hidden));
//! assert_eq!(preview.observe(store.session(), SessionChange::Released), None);
//! ```

use kurbo::{Point, Size};

use crate::measure::{MeasureSlot, MeasureTicket};
use crate::session::{Session, SessionChange};

/// Where the preview should be drawn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PreviewFrame {
    /// Draw nothing.
    Hidden,
    /// Draw the preview content with its top-left corner at `origin`.
    Shown {
        /// Absolute screen position of the content's top-left corner.
        origin: Point,
        /// `false` while the content size is unknown and the frame is corner-anchored.
        centered: bool,
    },
}

/// Receives preview frames; implemented by the toolkit's overlay layer.
pub trait PreviewSurface {
    /// Draw (or move) the overlay with its top-left corner at `origin`.
    fn show(&mut self, origin: Point);
    /// Remove the overlay.
    fn hide(&mut self);
}

/// Top-left corner that centers content of `size` on `pointer`.
#[must_use]
pub fn centered_origin(pointer: Point, size: Size) -> Point {
    pointer - size.to_vec2() * 0.5
}

/// Tracks the overlay size and visibility of the drag preview.
#[derive(Clone, Debug, Default)]
pub struct DragPreview {
    size: MeasureSlot<Size>,
    visible: bool,
    remeasure: bool,
    renders: u64,
}

impl DragPreview {
    /// Creates a hidden preview with unknown size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame for `session`, without changing any state.
    #[must_use]
    pub fn frame<P>(&self, session: &Session<P>) -> PreviewFrame {
        if !session.is_active() {
            return PreviewFrame::Hidden;
        }
        match self.size.get() {
            Some(size) => PreviewFrame::Shown {
                origin: centered_origin(session.live_position(), *size),
                centered: true,
            },
            None => PreviewFrame::Shown {
                origin: session.live_position(),
                centered: false,
            },
        }
    }

    /// Turns a session change into the frame to render, if any.
    ///
    /// Returns a `Shown` frame for every live-position update while the session is
    /// active, a single `Hidden` frame on the transition to inactive, and `None`
    /// otherwise. A start alone renders nothing: the live position still holds the
    /// previous drag's last point until the source streams its first move.
    pub fn observe<P>(&mut self, session: &Session<P>, change: SessionChange) -> Option<PreviewFrame> {
        if change == SessionChange::Started {
            return None;
        }
        if session.is_active() {
            self.visible = true;
            self.renders += 1;
            Some(self.frame(session))
        } else if self.visible {
            self.visible = false;
            Some(PreviewFrame::Hidden)
        } else {
            None
        }
    }

    /// Returns `true` if a measurement should be requested for the content.
    #[must_use]
    pub fn needs_measurement(&self) -> bool {
        self.remeasure || (self.size.get().is_none() && !self.size.is_pending())
    }

    /// Marks the content as changed so its size is measured again.
    ///
    /// The previous size keeps being used until the new one arrives.
    pub fn content_changed(&mut self) {
        self.remeasure = true;
    }

    /// Records a measurement request for the content.
    pub fn request_measurement(&mut self, ticket: MeasureTicket) -> MeasureTicket {
        self.remeasure = false;
        self.size.request(ticket)
    }

    /// Applies a size answer and returns the corrective frame if the preview is showing.
    pub fn complete_measurement<P>(
        &mut self,
        ticket: MeasureTicket,
        size: Size,
        session: &Session<P>,
    ) -> Option<PreviewFrame> {
        if self.set_size(ticket, size) {
            self.refresh(session)
        } else {
            None
        }
    }

    /// Applies a size answer. Returns `false` if it was out of date.
    pub fn set_size(&mut self, ticket: MeasureTicket, size: Size) -> bool {
        let applied = self.size.complete(ticket, size);
        if !applied {
            log::debug!("stale preview measurement {ticket:?} ignored");
        }
        applied
    }

    /// Re-renders the current frame if the preview is showing.
    pub fn refresh<P>(&mut self, session: &Session<P>) -> Option<PreviewFrame> {
        if self.visible && session.is_active() {
            self.renders += 1;
            Some(self.frame(session))
        } else {
            None
        }
    }

    /// The measured content size.
    #[must_use]
    pub fn content_size(&self) -> Option<Size> {
        self.size.get().copied()
    }

    /// Returns `true` between the first `Shown` frame of a drag and its `Hidden` frame.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of `Shown` frames produced so far.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}
