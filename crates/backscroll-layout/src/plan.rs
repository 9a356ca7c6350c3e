#![forbid(unsafe_code)]

//! Structured draw plans.
//!
//! A [`DrawPlan`] is the single product of laying out one message: the
//! ordered primitive operations a host replays onto its surface, and the
//! total height those operations occupy. Height is derived from the same
//! pass that positioned the operations, never from a second measurement.

use backscroll_core::{ColorId, FaceRef};

/// One primitive draw operation, positioned relative to the entry's own
/// top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Draw a text run with the color and font size active at emission.
    Text {
        x: f32,
        y: f32,
        text: String,
        color: ColorId,
        font_size: f32,
    },
    /// Draw an icon cell by index.
    Icon { x: f32, y: f32, index: u32 },
    /// Draw a face portrait.
    Face { x: f32, y: f32, face: FaceRef },
    /// Fill a rectangle.
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: ColorId,
    },
}

/// Ordered draw operations plus the measured total height.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawPlan {
    /// Operations in draw order.
    pub ops: Vec<DrawOp>,
    /// Total vertical extent of the entry, padding included.
    pub height: f32,
}

impl DrawPlan {
    /// Whether the plan draws nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
