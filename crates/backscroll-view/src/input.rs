#![forbid(unsafe_code)]

//! Logical input controls and the viewer configuration surface.
//!
//! The viewer never polls a device. Each tick the host hands it an
//! [`InputSource`] snapshot of this frame's logical controls; when the
//! viewer acts on one it calls [`InputSource::consume`] so the same press
//! cannot also drive the game world this frame. Focus is mutual exclusion
//! by priority order, not locking.

use backscroll_core::{DEFAULT_CAPACITY, ScrollerConfig};
use backscroll_layout::LayoutConfig;

use crate::phase::DEFAULT_OPEN_STEP;

// ============================================================================
// Controls
// ============================================================================

/// Logical controls the viewer interprets while it has input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Dismiss the viewer.
    Cancel,
    /// Scroll one step toward older history.
    Up,
    /// Scroll one step toward newer history.
    Down,
    /// Jump most of a viewport toward older history.
    PageUp,
    /// Jump most of a viewport toward newer history.
    PageDown,
    /// The configured key that opens and closes the viewer.
    Toggle,
}

/// One frame's sampled input state.
///
/// `triggered` is an edge (pressed this frame), `repeated` an edge with
/// key-repeat, `wheel` a continuous per-frame delta. `consume` clears the
/// frame's state so the host's own handlers see nothing.
pub trait InputSource {
    /// Whether `control` was newly pressed this frame.
    fn triggered(&self, control: Control) -> bool;

    /// Whether `control` is pressed with repeat this frame.
    fn repeated(&self, control: Control) -> bool;

    /// This frame's wheel delta; positive scrolls toward newer history.
    fn wheel(&self) -> f32;

    /// Eat the remainder of this frame's input.
    fn consume(&mut self);
}

// ============================================================================
// Configuration
// ============================================================================

/// Viewer tuning. Everything has a default; the toggle key is the one
/// option hosts are expected to expose to players.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Logical history capacity.
    pub capacity: usize,
    /// Host key name mapped onto [`Control::Toggle`].
    pub toggle_key: String,
    /// Visible band height in layout units.
    pub viewport_height: f32,
    /// Scroll impulse applied per up/down repeat.
    pub line_step: f64,
    /// Fraction of the viewport jumped per page up/down.
    pub page_fraction: f32,
    /// Openness change per tick of the open/close ramp.
    pub open_step: u8,
    /// Entry layout geometry and palette.
    pub layout: LayoutConfig,
    /// Scroll physics tuning.
    pub scroller: ScrollerConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            toggle_key: "tab".to_string(),
            viewport_height: 624.0,
            line_step: 2.0,
            page_fraction: 0.8,
            open_step: DEFAULT_OPEN_STEP,
            layout: LayoutConfig::default(),
            scroller: ScrollerConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history capacity. Clamped to at least 1.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the host key name that toggles the viewer.
    #[must_use]
    pub fn toggle_key(mut self, key: impl Into<String>) -> Self {
        self.toggle_key = key.into();
        self
    }

    /// Set the visible band height.
    #[must_use]
    pub fn viewport_height(mut self, height: f32) -> Self {
        self.viewport_height = height.max(0.0);
        self
    }

    /// Set the entry layout configuration.
    #[must_use]
    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Set the scroll physics tuning.
    #[must_use]
    pub fn scroller(mut self, scroller: ScrollerConfig) -> Self {
        self.scroller = scroller;
        self
    }
}
