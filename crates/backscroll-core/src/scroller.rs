#![forbid(unsafe_code)]

//! Momentum (inertial) scroll physics.
//!
//! A [`MomentumScroller`] owns a 1-D position/velocity pair over a fixed
//! travel range. Impulses accelerate it; friction decays the velocity each
//! tick. An impulse opposing the current motion (a "pull") decelerates at a
//! markedly stronger rate so a single reversing input stops momentum
//! instead of waiting out the friction decay.
//!
//! # Invariants
//!
//! 1. After [`update`](MomentumScroller::update), `0 ≤ position ≤ range`.
//! 2. `|velocity| ≤ max_velocity` except transiently inside a pull that is
//!    about to snap to zero.
//! 3. A pull that carries velocity across zero into the impulse's own sign
//!    snaps velocity to exactly `0.0` (no overshoot oscillation).
//! 4. `|velocity|` below the rest threshold is treated as rest; the
//!    position no longer changes.
//!
//! # Failure Modes
//!
//! - A non-positive range degenerates to a scroller pinned at 0; positions
//!   are clamped, never rejected.
//! - Friction outside `(0, 1)` is clamped on construction; friction of 1.0
//!   would never come to rest.

/// Velocity magnitude below which the scroller is considered at rest.
const REST_EPSILON: f64 = 1e-6;

/// Upper clamp for friction; exactly 1.0 never decays.
const MAX_FRICTION: f64 = 0.999;

/// Tuning parameters for a [`MomentumScroller`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollerConfig {
    /// Velocity magnitude cap.
    pub max_velocity: f64,
    /// Per-tick multiplicative velocity decay, in `(0, 1)`.
    pub friction: f64,
    /// Velocity gained per unit of impulse.
    pub acceleration: f64,
    /// Velocity lost per unit of impulse when pulling against motion.
    pub pull_acceleration: f64,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        let acceleration = 5.0;
        Self {
            max_velocity: 100.0,
            friction: 0.98,
            acceleration,
            pull_acceleration: acceleration * 4.0,
        }
    }
}

impl ScrollerConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the velocity cap. Clamped to a minimum of 0.0.
    #[must_use]
    pub fn max_velocity(mut self, v: f64) -> Self {
        self.max_velocity = v.max(0.0);
        self
    }

    /// Set per-tick friction. Clamped into `(0, 1)`.
    #[must_use]
    pub fn friction(mut self, f: f64) -> Self {
        self.friction = f.clamp(0.0, MAX_FRICTION);
        self
    }

    /// Set acceleration per unit of impulse. The pull rate keeps its 4×
    /// ratio unless overridden afterwards.
    #[must_use]
    pub fn acceleration(mut self, a: f64) -> Self {
        self.acceleration = a.max(0.0);
        self.pull_acceleration = self.acceleration * 4.0;
        self
    }

    /// Set the pull deceleration rate independently.
    #[must_use]
    pub fn pull_acceleration(mut self, a: f64) -> Self {
        self.pull_acceleration = a.max(0.0);
        self
    }
}

/// Sign with the zero case preserved (`f64::signum` maps 0.0 to 1.0,
/// which would misclassify impulses onto a resting scroller as pulls).
#[inline]
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// 1-D inertial scroller over `[0, range]`.
#[derive(Debug, Clone)]
pub struct MomentumScroller {
    range: f64,
    position: f64,
    velocity: f64,
    config: ScrollerConfig,
}

impl MomentumScroller {
    /// Create a scroller over `[0, range]` seeded at `initial` (clamped
    /// into range).
    #[must_use]
    pub fn new(range: f64, initial: f64, config: ScrollerConfig) -> Self {
        let range = range.max(0.0);
        Self {
            range,
            position: initial.clamp(0.0, range),
            velocity: 0.0,
            config,
        }
    }

    /// Travel range.
    #[inline]
    #[must_use]
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Current position, always within `[0, range]`.
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Whether the scroller is at rest (velocity below the threshold).
    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.velocity.abs() < REST_EPSILON
    }

    /// Apply a scroll impulse.
    ///
    /// An impulse whose sign opposes the current velocity is a pull and
    /// uses the stronger pull rate; if the pull carries velocity through
    /// zero into the impulse's own sign, velocity snaps to exactly zero.
    /// Otherwise the result is clamped to `±max_velocity`.
    pub fn scroll(&mut self, delta: f64) {
        let pull = sign(delta) * sign(self.velocity) < 0.0;
        let rate = if pull {
            self.config.pull_acceleration
        } else {
            self.config.acceleration
        };
        self.velocity += delta * rate;
        if pull && sign(self.velocity) == sign(delta) {
            self.velocity = 0.0;
        } else {
            self.velocity = self
                .velocity
                .clamp(-self.config.max_velocity, self.config.max_velocity);
        }
    }

    /// One physics tick: integrate position, clamp into range, decay
    /// velocity. Below the rest threshold the tick is a no-op apart from
    /// zeroing the residual velocity.
    pub fn update(&mut self) {
        if self.velocity.abs() < REST_EPSILON {
            self.velocity = 0.0;
            return;
        }
        self.position = (self.position + self.velocity).clamp(0.0, self.range);
        self.velocity *= self.config.friction;
    }

    /// Jump to a position (clamped). Velocity is untouched.
    pub fn set_position(&mut self, position: f64) {
        self.position = position.clamp(0.0, self.range);
    }

    /// Kill all momentum. Position is untouched.
    pub fn stop(&mut self) {
        self.velocity = 0.0;
    }
}
