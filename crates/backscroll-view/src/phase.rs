#![forbid(unsafe_code)]

//! Open/close phase machine with a discrete opacity ramp.
//!
//! State machine: Closed → Opening → Open → Closing → Closed.
//!
//! The ramp is a discrete 0..=255 openness value stepped by a fixed amount
//! each tick. Rapid toggling reverses mid-ramp: the old direction is
//! abandoned and the new ramp continues from the current openness, so
//! there is never a visible opacity jump.
//!
//! # Example
//!
//! ```
//! use backscroll_view::phase::OpenState;
//!
//! let mut state = OpenState::default();
//! state.open();
//! while state.is_animating() {
//!     state.tick();
//! }
//! assert!(state.is_open());
//! ```
//!
//! # Invariants
//!
//! 1. Openness is 255 exactly when the phase is `Open`, 0 exactly when
//!    `Closed`, and strictly between during a ramp step away from either.
//! 2. `tick()` changes openness by at most one step.
//! 3. Reversal never resets openness.

// ============================================================================
// Phase
// ============================================================================

/// Lifecycle phase of the viewer overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerPhase {
    /// Fully hidden; input passes through to the host.
    #[default]
    Closed,
    /// Ramping up to full visibility.
    Opening,
    /// Fully visible and interactive.
    Open,
    /// Ramping down to hidden.
    Closing,
}

impl ViewerPhase {
    /// Whether the overlay should be rendered at all.
    #[inline]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Whether a ramp is in progress.
    #[inline]
    pub fn is_animating(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

// ============================================================================
// Open State
// ============================================================================

/// Default openness change per tick (16 ticks for a full ramp).
pub const DEFAULT_OPEN_STEP: u8 = 16;

/// Phase plus the discrete openness ramp driving overlay opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenState {
    phase: ViewerPhase,
    openness: u8,
    step: u8,
}

impl Default for OpenState {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_STEP)
    }
}

impl OpenState {
    /// Closed state ramping by `step` per tick. Step is clamped to at
    /// least 1 so a ramp always terminates.
    #[must_use]
    pub fn new(step: u8) -> Self {
        Self {
            phase: ViewerPhase::Closed,
            openness: 0,
            step: step.max(1),
        }
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> ViewerPhase {
        self.phase
    }

    /// Raw openness in 0..=255.
    #[inline]
    pub fn openness(&self) -> u8 {
        self.openness
    }

    /// Openness as an opacity fraction in `[0, 1]`.
    #[inline]
    pub fn fraction(&self) -> f32 {
        f32::from(self.openness) / 255.0
    }

    /// Whether the viewer is fully open and interactive.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.phase == ViewerPhase::Open
    }

    /// Whether the viewer is fully closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.phase == ViewerPhase::Closed
    }

    /// Whether a ramp is in progress.
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.phase.is_animating()
    }

    /// Request the open ramp. No-op when already open or opening; a
    /// closing ramp reverses from its current openness.
    pub fn open(&mut self) {
        if matches!(self.phase, ViewerPhase::Closed | ViewerPhase::Closing) {
            self.phase = ViewerPhase::Opening;
        }
    }

    /// Request the close ramp. No-op when already closed or closing; an
    /// opening ramp reverses from its current openness.
    pub fn close(&mut self) {
        if matches!(self.phase, ViewerPhase::Open | ViewerPhase::Opening) {
            self.phase = ViewerPhase::Closing;
        }
    }

    /// Advance the ramp one tick. Settles into `Open` at 255 and
    /// `Closed` at 0; no-op in the settled phases.
    pub fn tick(&mut self) {
        match self.phase {
            ViewerPhase::Opening => {
                self.openness = self.openness.saturating_add(self.step);
                if self.openness == u8::MAX {
                    self.phase = ViewerPhase::Open;
                }
            }
            ViewerPhase::Closing => {
                self.openness = self.openness.saturating_sub(self.step);
                if self.openness == 0 {
                    self.phase = ViewerPhase::Closed;
                }
            }
            ViewerPhase::Closed | ViewerPhase::Open => {}
        }
    }
}
