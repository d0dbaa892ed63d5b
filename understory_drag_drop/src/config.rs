// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning knobs for a [`DragDrop`](crate::host::DragDrop) owner.

use crate::target::OverlapPolicy;

/// Configuration for a drag-and-drop owner.
///
/// ```
/// use understory_drag_drop::config::DragDropConfig;
/// use understory_drag_drop::target::OverlapPolicy;
///
/// let config = DragDropConfig::default()
///     .with_activation_distance(8.0)
///     .with_overlap(OverlapPolicy::All)
///     .with_staleness_window(Some(1));
/// assert_eq!(config.activation_distance, 8.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragDropConfig {
    /// Distance the pointer must travel from the press point before a drag starts.
    ///
    /// `0.0` starts the drag on the first movement.
    pub activation_distance: f64,
    /// Which targets receive a release that lands in more than one.
    pub overlap: OverlapPolicy,
    /// How many newer measurement requests a target's cached bounds may lag behind
    /// and still be used for hit testing. `None` always uses the latest answer.
    pub staleness_window: Option<u64>,
}

impl Default for DragDropConfig {
    fn default() -> Self {
        Self {
            activation_distance: 0.0,
            overlap: OverlapPolicy::FirstRegistered,
            staleness_window: None,
        }
    }
}

impl DragDropConfig {
    /// Sets [`DragDropConfig::activation_distance`]; negative values clamp to zero.
    #[must_use]
    pub fn with_activation_distance(mut self, distance: f64) -> Self {
        self.activation_distance = distance.max(0.0);
        self
    }

    /// Sets [`DragDropConfig::overlap`].
    #[must_use]
    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    /// Sets [`DragDropConfig::staleness_window`].
    #[must_use]
    pub fn with_staleness_window(mut self, window: Option<u64>) -> Self {
        self.staleness_window = window;
        self
    }
}
