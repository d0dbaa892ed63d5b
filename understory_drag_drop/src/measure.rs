// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous layout measurement as an explicit request/response pair.
//!
//! Layout measurement cannot complete synchronously: the platform has to finish
//! laying out before it can report where a region ended up. A [`MeasureSlot`]
//! models this with tickets:
//!
//! 1) On every layout change, call [`MeasureSlot::request`] and forward the returned
//!    [`MeasureTicket`] to the platform.
//! 2) When the platform answers, call [`MeasureSlot::complete`] with the same ticket.
//!
//! Answers may arrive late or out of order. An answer is applied unless an answer
//! to a *newer* request has already been applied, so the slot always holds the
//! result of the most recent request that completed. The value's
//! [staleness](MeasureSlot::staleness) is how many requests were issued after the
//! one that produced it; [`MeasureSlot::get_within`] only returns values inside a
//! staleness window.
//!
//! ```
//! use understory_drag_drop::measure::{MeasureSlot, MeasureTicket};
//!
//! let mut next = 0;
//! let mut alloc = || { next += 1; MeasureTicket::new(next) };
//!
//! let mut slot = MeasureSlot::<f64>::new();
//! let first = slot.request(alloc());
//! let second = slot.request(alloc());
//!
//! // The newer answer lands first; the older one is then ignored.
//! assert!(slot.complete(second, 2.0));
//! assert!(!slot.complete(first, 1.0));
//! assert_eq!(slot.get(), Some(&2.0));
//! assert_eq!(slot.staleness(), Some(0));
//! ```

use smallvec::SmallVec;

use crate::target::TargetId;

/// Identifies one measurement request.
///
/// Tickets are ordered: a greater ticket belongs to a later request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeasureTicket(u64);

impl MeasureTicket {
    /// Creates a ticket from a raw value.
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

/// What a measurement request is for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MeasureSubject {
    /// A drop target's wrapper; answer with its absolute bounds.
    Target(TargetId),
    /// The floating preview's content; answer with its size.
    Preview,
}

/// An outbound measurement request for the platform's layout facility.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeasureRequest {
    /// What to measure.
    pub subject: MeasureSubject,
    /// Ticket to echo back with the answer.
    pub ticket: MeasureTicket,
}

/// Cached result of asynchronous measurements.
#[derive(Clone, Debug, Default)]
pub struct MeasureSlot<T> {
    value: Option<T>,
    applied: Option<MeasureTicket>,
    // Outstanding requests newer than `applied`, oldest first.
    pending: SmallVec<[MeasureTicket; 2]>,
}

impl<T> MeasureSlot<T> {
    /// Creates an empty slot with no outstanding requests.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: None,
            applied: None,
            pending: SmallVec::new(),
        }
    }

    /// Records a new request and returns its ticket.
    pub fn request(&mut self, ticket: MeasureTicket) -> MeasureTicket {
        debug_assert!(
            self.pending.last().or(self.applied.as_ref()).is_none_or(|last| ticket > *last),
            "measurement tickets must increase"
        );
        self.pending.push(ticket);
        ticket
    }

    /// Applies an answer. Returns `false` if it was ignored as out of date or unknown.
    ///
    /// Applying an answer retires its request and every older one still pending.
    pub fn complete(&mut self, ticket: MeasureTicket, value: T) -> bool {
        if self.applied == Some(ticket) {
            self.value = Some(value);
            return true;
        }
        let Some(idx) = self.pending.iter().position(|t| *t == ticket) else {
            return false;
        };
        self.pending.drain(..=idx);
        self.applied = Some(ticket);
        self.value = Some(value);
        true
    }

    /// The most recently applied value, regardless of staleness.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The applied value if its staleness is within `window` (`None` means unlimited).
    #[must_use]
    pub fn get_within(&self, window: Option<u64>) -> Option<&T> {
        let staleness = self.staleness()?;
        match window {
            Some(max) if staleness > max => None,
            _ => self.value.as_ref(),
        }
    }

    /// Number of requests issued after the one whose answer is cached.
    ///
    /// `None` until a first answer arrives.
    #[must_use]
    pub fn staleness(&self) -> Option<u64> {
        self.value.as_ref()?;
        Some(self.pending.len() as u64)
    }

    /// Returns `true` if a request is still waiting for its answer.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
