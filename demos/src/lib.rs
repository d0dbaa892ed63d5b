// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless layout helpers shared by the demos.
//!
//! The demo screen is split into two columns. The left column holds three
//! 100x100 drop boxes, each centered in a third of the column height. The right
//! column is filled by three colored swatches stacked on top of each other.

use kurbo::{Point, Rect, Size};
use understory_drag_drop::command::DragMessage;
use understory_drag_drop::handle::HandleError;
use understory_drag_drop::host::DragDrop;
use understory_drag_drop::measure::MeasureSubject;
use understory_drag_drop::target::TargetId;

/// Screen size of the demo window.
pub const SCREEN: Size = Size::new(400.0, 600.0);

/// Side length of a drop box.
pub const BOX: f64 = 100.0;

/// Bounds of the `row`-th drop box in the left column.
#[must_use]
pub fn drop_box(row: usize) -> Rect {
    let column = SCREEN.width / 2.0;
    let band = SCREEN.height / 3.0;
    let center = Point::new(column / 2.0, band * (row as f64 + 0.5));
    Rect::from_center_size(center, (BOX, BOX))
}

/// Bounds of the `row`-th swatch in the right column.
#[must_use]
pub fn swatch(row: usize) -> Rect {
    let band = SCREEN.height / 3.0;
    let top = band * row as f64;
    Rect::new(SCREEN.width / 2.0, top, SCREEN.width, top + band)
}

/// Answers pending measurement requests the way a layout pass would.
///
/// `targets[i]` is laid out at [`drop_box(i)`](drop_box); the preview is a
/// `BOX`-sized square.
pub fn layout_pass<P>(dnd: &mut DragDrop<P>, targets: &[TargetId]) -> Result<usize, HandleError> {
    let handle = dnd.handle();
    let mut answered = 0;
    for req in dnd.take_measure_requests() {
        let msg = match req.subject {
            MeasureSubject::Target(id) => {
                let Some(row) = targets.iter().position(|t| *t == id) else {
                    continue;
                };
                DragMessage::TargetMeasured {
                    target: id,
                    ticket: req.ticket,
                    bounds: drop_box(row),
                }
            }
            MeasureSubject::Preview => DragMessage::PreviewMeasured {
                ticket: req.ticket,
                size: Size::new(BOX, BOX),
            },
        };
        handle.send(msg)?;
        answered += 1;
    }
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxes_are_centered_in_their_bands() {
        assert_eq!(drop_box(0), Rect::new(50.0, 50.0, 150.0, 150.0));
        assert_eq!(drop_box(2), Rect::new(50.0, 450.0, 150.0, 550.0));
    }

    #[test]
    fn swatches_fill_the_right_column() {
        assert_eq!(swatch(1), Rect::new(200.0, 200.0, 400.0, 400.0));
    }
}
