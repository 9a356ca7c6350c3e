#![forbid(unsafe_code)]

//! Top-level message replay viewer.
//!
//! [`ReplayViewer`] ties the pieces together: the history buffer, the
//! open/close ramp, the view cache, and the optional momentum scroller.
//! The host surface is deliberately narrow: `enqueue` new records as the
//! game produces them, `tick` once per frame with this frame's input, and
//! draw whatever [`frame`](ReplayViewer::frame) returns.
//!
//! # Invariants
//!
//! 1. Within one tick: input is handled before physics, physics before
//!    the geometry a subsequent `frame()` call observes.
//! 2. `tick` returns `true` exactly when the viewer claimed this frame's
//!    input; the host must then skip its own handlers.
//! 3. A scroller exists iff content overflows the viewport; when content
//!    fits, the scroll position is pinned at 0.
//! 4. Structural changes (entry appeared or evicted) snap the view to the
//!    bottom of history.

use backscroll_core::{
    ControlCodeDecoder, EscapeDecoder, HistoryBuffer, MessageId, MomentumScroller, RawMessage,
};
use backscroll_layout::{AssetCatalog, DrawPlan, TextMeasure};

use crate::input::{Control, InputSource, ViewerConfig};
use crate::phase::{OpenState, ViewerPhase};
use crate::reconcile::{Reconciliation, ViewCache, fade_factor};

// ============================================================================
// Frame Output
// ============================================================================

/// What a placed element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacedKind {
    /// The "older history truncated" sentinel.
    Ellipsis,
    /// A history entry.
    Entry(MessageId),
    /// The divider below a history entry.
    Divider(MessageId),
}

/// One element positioned for this frame, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed<'a> {
    /// Element kind and owning identity.
    pub kind: PlacedKind,
    /// Screen-space vertical offset (baseline minus scroll).
    pub y: f32,
    /// Composited opacity: openness fraction times edge fade.
    pub opacity: f32,
    /// Geometry to replay at `y`.
    pub plan: &'a DrawPlan,
}

/// Composited output of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'a> {
    /// Overall overlay opacity in `[0, 1]`.
    pub openness: f32,
    /// Clamped scroll position.
    pub scroll_y: f32,
    /// Total content height, viewport-floored.
    pub content_height: f32,
    /// Elements top to bottom, oldest first.
    pub placed: Vec<Placed<'a>>,
}

// ============================================================================
// Viewer
// ============================================================================

/// In-session message history viewer.
#[derive(Debug)]
pub struct ReplayViewer<M, A, D = ControlCodeDecoder> {
    buffer: HistoryBuffer<D>,
    cache: ViewCache,
    state: OpenState,
    scroller: Option<MomentumScroller>,
    scroll_y: f32,
    content_height: f32,
    config: ViewerConfig,
    measure: M,
    catalog: A,
    dirty: bool,
}

impl<M, A> ReplayViewer<M, A>
where
    M: TextMeasure,
    A: AssetCatalog,
{
    /// Viewer with the built-in escape decoder.
    #[must_use]
    pub fn new(config: ViewerConfig, measure: M, catalog: A) -> Self {
        Self::with_decoder(config, measure, catalog, ControlCodeDecoder)
    }
}

impl<M, A, D> ReplayViewer<M, A, D>
where
    M: TextMeasure,
    A: AssetCatalog,
    D: EscapeDecoder,
{
    /// Viewer tokenizing text through a custom escape decoder.
    #[must_use]
    pub fn with_decoder(config: ViewerConfig, measure: M, catalog: A, decoder: D) -> Self {
        let buffer = HistoryBuffer::new(config.capacity, decoder);
        let state = OpenState::new(config.open_step);
        Self {
            buffer,
            cache: ViewCache::new(),
            state,
            scroller: None,
            scroll_y: 0.0,
            content_height: config.viewport_height,
            config,
            measure,
            catalog,
            dirty: false,
        }
    }

    /// Record a new message. Tokenization happens here, once; the view
    /// picks the entry up on the next refresh.
    pub fn enqueue(&mut self, raw: RawMessage) -> MessageId {
        let id = self.buffer.enqueue(raw);
        self.dirty = true;
        #[cfg(feature = "tracing")]
        tracing::debug!(id = id.0, len = self.buffer.len(), "message recorded");
        id
    }

    /// The recorded history, oldest first.
    #[inline]
    pub fn history(&self) -> &HistoryBuffer<D> {
        &self.buffer
    }

    /// Viewer configuration.
    #[inline]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> ViewerPhase {
        self.state.phase()
    }

    /// Whether the viewer is fully open and interactive.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Whether anything should be drawn at all.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.state.phase().is_visible()
    }

    /// Clamped scroll position.
    #[inline]
    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Content height from the last refresh, viewport-floored.
    #[inline]
    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    /// Start the open ramp and bring the view up to date.
    pub fn open(&mut self) {
        self.state.open();
        self.refresh();
        #[cfg(feature = "tracing")]
        tracing::debug!(openness = self.state.openness(), "viewer opening");
    }

    /// Start the close ramp. Immediate; an in-flight open ramp reverses.
    pub fn close(&mut self) {
        self.state.close();
        #[cfg(feature = "tracing")]
        tracing::debug!(openness = self.state.openness(), "viewer closing");
    }

    /// Reconcile views against the buffer and rebuild scroll state.
    ///
    /// A structural change snaps the position to the bottom of history.
    /// The scroller is rebuilt seeded at the (possibly snapped) position
    /// when content overflows, and dropped when everything fits.
    pub fn refresh(&mut self) -> Reconciliation {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("viewer_refresh", entries = self.buffer.len()).entered();

        let rec = self.cache.refresh(
            &self.buffer,
            &self.config.layout,
            &mut self.measure,
            &self.catalog,
            self.config.viewport_height,
        );
        self.content_height = rec.content_height;
        let range = (self.content_height - self.config.viewport_height).max(0.0);
        if rec.structural_change {
            self.scroll_y = range;
        }
        self.scroll_y = self.scroll_y.clamp(0.0, range);
        if self.content_height > self.config.viewport_height {
            self.scroller = Some(MomentumScroller::new(
                f64::from(range),
                f64::from(self.scroll_y),
                self.config.scroller.clone(),
            ));
        } else {
            self.scroller = None;
            self.scroll_y = 0.0;
        }
        self.dirty = false;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            created = rec.created.len(),
            destroyed = rec.destroyed.len(),
            content_height = rec.content_height,
            "refresh reconciled"
        );
        rec
    }

    /// One host frame.
    ///
    /// `can_open` reports whether the underlying game currently permits
    /// the overlay (player free to act, no modal message pending).
    /// Returns `true` when the viewer claimed this frame's input.
    pub fn tick(&mut self, input: &mut impl InputSource, can_open: bool) -> bool {
        if self.state.is_animating() {
            self.state.tick();
            return false;
        }
        if self.state.is_open() {
            if self.dirty {
                self.refresh();
            }
            if self.handle_input(input) {
                return true;
            }
            if let Some(scroller) = &mut self.scroller {
                scroller.update();
                self.scroll_y = scroller.position() as f32;
            }
            return false;
        }
        if can_open && input.triggered(Control::Toggle) {
            input.consume();
            self.open();
            return true;
        }
        false
    }

    fn handle_input(&mut self, input: &mut impl InputSource) -> bool {
        if input.triggered(Control::Cancel) || input.triggered(Control::Toggle) {
            input.consume();
            self.close();
            return true;
        }
        let step = self.config.line_step;
        let page = f64::from(self.config.viewport_height * self.config.page_fraction);
        if let Some(scroller) = &mut self.scroller {
            if input.repeated(Control::Up) {
                scroller.scroll(-step);
                return true;
            }
            if input.repeated(Control::Down) {
                scroller.scroll(step);
                return true;
            }
            if input.repeated(Control::PageUp) {
                scroller.stop();
                scroller.set_position(scroller.position() - page);
                return true;
            }
            if input.repeated(Control::PageDown) {
                scroller.stop();
                scroller.set_position(scroller.position() + page);
                return true;
            }
            let wheel = input.wheel();
            if wheel != 0.0 {
                // sign only, never magnitude
                scroller.scroll(f64::from(wheel.signum()));
                return true;
            }
        }
        false
    }

    /// Composite this frame's geometry and opacities.
    ///
    /// When content fits the viewport every element sits at its baseline
    /// at full fade; otherwise each element fades by its overlap with the
    /// visible band. The suppressed trailing divider is omitted.
    pub fn frame(&self) -> Frame<'_> {
        let viewport = self.config.viewport_height;
        let fits = self.content_height <= viewport;
        let scroll = if fits {
            0.0
        } else {
            self.scroll_y.clamp(0.0, self.content_height - viewport)
        };
        let openness = self.state.fraction();
        let fade = |base_y: f32, height: f32| {
            if fits {
                1.0
            } else {
                fade_factor(base_y, height, scroll, viewport)
            }
        };

        let mut placed = Vec::new();
        if self.cache.ellipsis_visible() {
            let plan = self.cache.ellipsis_plan();
            let base_y = self.cache.ellipsis_base_y();
            placed.push(Placed {
                kind: PlacedKind::Ellipsis,
                y: base_y - scroll,
                opacity: openness * fade(base_y, plan.height),
                plan,
            });
        }
        for &id in self.cache.order() {
            let Some(view) = self.cache.get(id) else {
                continue;
            };
            placed.push(Placed {
                kind: PlacedKind::Entry(id),
                y: view.base_y - scroll,
                opacity: openness * fade(view.base_y, view.plan.height),
                plan: &view.plan,
            });
            if !view.divider_suppressed {
                let plan = self.cache.divider_plan();
                placed.push(Placed {
                    kind: PlacedKind::Divider(id),
                    y: view.divider_base_y - scroll,
                    opacity: openness * fade(view.divider_base_y, plan.height),
                    plan,
                });
            }
        }

        Frame {
            openness,
            scroll_y: scroll,
            content_height: self.content_height,
            placed,
        }
    }
}
