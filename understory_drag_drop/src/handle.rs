// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handle for posting messages to the session owner from anywhere.
//!
//! A [`DragHandle`] is the sending half of the owner's queue. Clone it freely and
//! pass it to sources, measurement callbacks, or other threads; all of them post
//! [`DragMessage`]s, and the owner applies them in arrival order on its own thread
//! (see [`DragDrop::pump`](crate::host::DragDrop::pump)).
//!
//! ```
//! use std::thread;
//!
//! use kurbo::Point;
//! use understory_drag_drop::command::{DragCommand, DragMessage};
//! use understory_drag_drop::handle::channel;
//! use understory_drag_drop::source::SourceId;
//!
//! let (handle, rx) = channel::<u32>();
//! let worker = thread::spawn(move || {
//!     handle.send_command(SourceId::new(1), DragCommand::Start(5)).unwrap();
//!     handle.send_command(SourceId::new(1), DragCommand::End(Point::ZERO)).unwrap();
//! });
//! worker.join().unwrap();
//!
//! assert_eq!(rx.try_iter().count(), 2);
//! ```

use core::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::command::{DragCommand, DragMessage};
use crate::source::SourceId;

/// Error returned when the session owner is gone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HandleError {
    /// The owner (and with it the receiving half of the queue) was dropped.
    Disconnected,
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("drag session owner has been dropped"),
        }
    }
}

impl core::error::Error for HandleError {}

/// Cloneable sender for [`DragMessage`]s.
///
/// `Send` whenever `P` is.
pub struct DragHandle<P> {
    tx: Sender<DragMessage<P>>,
}

/// Creates a handle and the receiving half it feeds.
///
/// [`DragDrop::new`](crate::host::DragDrop::new) calls this internally; use it
/// directly only when driving a [`DragStore`](crate::session::DragStore) by hand.
#[must_use]
pub fn channel<P>() -> (DragHandle<P>, Receiver<DragMessage<P>>) {
    let (tx, rx) = mpsc::channel();
    (DragHandle { tx }, rx)
}

impl<P> DragHandle<P> {
    /// Posts a message to the owner.
    pub fn send(&self, message: DragMessage<P>) -> Result<(), HandleError> {
        self.tx.send(message).map_err(|_| HandleError::Disconnected)
    }

    /// Posts a drag command on behalf of `source`.
    pub fn send_command(&self, source: SourceId, command: DragCommand<P>) -> Result<(), HandleError> {
        self.send(DragMessage::Drag { source, command })
    }
}

impl<P> Clone for DragHandle<P> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<P> fmt::Debug for DragHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragHandle").finish_non_exhaustive()
    }
}
