#![forbid(unsafe_code)]

//! Measurement and asset collaborator traits.
//!
//! The layout engine needs two things from its host: how wide a piece of
//! text is under the active font, and what an item or face reference
//! resolves to. Both are traits so a real renderer can answer from its
//! glyph metrics and asset tables while tests run against the
//! deterministic built-ins here.
//!
//! # Invariants
//!
//! 1. Font mutations are scoped to one layout pass; [`layout_message`]
//!    calls [`TextMeasure::reset_font`] before touching any tokens.
//! 2. Font size stays within `[FONT_MIN, FONT_MAX]` under any sequence of
//!    grow/shrink calls.
//!
//! [`layout_message`]: crate::entry::layout_message

use backscroll_core::{FaceRef, ItemRef};
use unicode_width::UnicodeWidthStr;

/// Font step applied by one grow or shrink.
pub const FONT_STEP: f32 = 12.0;
/// Smallest font size shrink will reach.
pub const FONT_MIN: f32 = 16.0;
/// Largest font size grow will reach.
pub const FONT_MAX: f32 = 108.0;
/// Default active font size.
pub const DEFAULT_FONT_SIZE: f32 = 28.0;

/// Text measurement and font state for one layout pass.
pub trait TextMeasure {
    /// Width of `text` under the active font.
    fn measure(&self, text: &str) -> f32;

    /// Active font size, which is also the text line height contribution.
    fn font_size(&self) -> f32;

    /// Step the active font up one size.
    fn grow_font(&mut self);

    /// Step the active font down one size.
    fn shrink_font(&mut self);

    /// Restore the default font size.
    fn reset_font(&mut self);

    /// Icon cell dimensions (width, height).
    fn icon_size(&self) -> (f32, f32);

    /// Face portrait dimensions (width, height).
    fn face_size(&self) -> (f32, f32);
}

/// Item and face resolution.
pub trait AssetCatalog {
    /// Display name for an item, if the reference resolves.
    fn item_name(&self, item: ItemRef) -> Option<String>;

    /// Icon index for an item, if the reference resolves.
    fn item_icon(&self, item: ItemRef) -> Option<u32>;

    /// Whether the face portrait is loaded and drawable right now.
    fn face_ready(&self, face: &FaceRef) -> bool;
}

/// Deterministic fixed-advance measurer.
///
/// Every display column advances by half the active font size, with
/// display width from `unicode-width` so CJK text measures double. Grow
/// and shrink step by [`FONT_STEP`]; a grow refuses to leave `FONT_MAX`
/// behind and a shrink refuses to pass `FONT_MIN`, mirroring the usual
/// grow-while-small / shrink-while-large guard.
#[derive(Debug, Clone)]
pub struct FixedMeasure {
    font_size: f32,
    default_size: f32,
}

impl Default for FixedMeasure {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE)
    }
}

impl FixedMeasure {
    /// Measurer with `default_size` as the reset target.
    #[must_use]
    pub fn new(default_size: f32) -> Self {
        let default_size = default_size.clamp(FONT_MIN, FONT_MAX);
        Self {
            font_size: default_size,
            default_size,
        }
    }
}

impl TextMeasure for FixedMeasure {
    fn measure(&self, text: &str) -> f32 {
        text.width() as f32 * (self.font_size * 0.5)
    }

    fn font_size(&self) -> f32 {
        self.font_size
    }

    fn grow_font(&mut self) {
        if self.font_size <= FONT_MAX - FONT_STEP {
            self.font_size += FONT_STEP;
        }
    }

    fn shrink_font(&mut self) {
        if self.font_size >= FONT_MIN + FONT_STEP {
            self.font_size -= FONT_STEP;
        }
    }

    fn reset_font(&mut self) {
        self.font_size = self.default_size;
    }

    fn icon_size(&self) -> (f32, f32) {
        (32.0, 32.0)
    }

    fn face_size(&self) -> (f32, f32) {
        (144.0, 144.0)
    }
}

/// Catalog that resolves nothing. Items come back unnamed and no face is
/// ever ready, so layout degrades to its text-only paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCatalog;

impl AssetCatalog for NullCatalog {
    fn item_name(&self, _item: ItemRef) -> Option<String> {
        None
    }

    fn item_icon(&self, _item: ItemRef) -> Option<u32> {
        None
    }

    fn face_ready(&self, _face: &FaceRef) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_measure_half_em_advance() {
        let m = FixedMeasure::default();
        assert_eq!(m.measure("abcd"), 4.0 * 14.0);
        assert_eq!(m.measure(""), 0.0);
    }

    #[test]
    fn wide_glyphs_measure_double() {
        let m = FixedMeasure::default();
        assert_eq!(m.measure("漢字"), 4.0 * 14.0);
    }

    #[test]
    fn grow_scales_measurement() {
        let mut m = FixedMeasure::default();
        m.grow_font();
        assert_eq!(m.font_size(), 40.0);
        assert_eq!(m.measure("ab"), 2.0 * 20.0);
    }

    #[test]
    fn font_clamped_at_both_ends() {
        // From the 28.0 default the 12.0 step tops out at 100.0; the
        // ceiling itself sits on the step grid starting from 24.0.
        let mut m = FixedMeasure::default();
        for _ in 0..50 {
            m.grow_font();
        }
        assert_eq!(m.font_size(), 100.0);
        for _ in 0..50 {
            m.shrink_font();
        }
        assert_eq!(m.font_size(), FONT_MIN);

        let mut g = FixedMeasure::new(24.0);
        for _ in 0..50 {
            g.grow_font();
        }
        assert_eq!(g.font_size(), FONT_MAX);
    }

    #[test]
    fn reset_restores_default() {
        let mut m = FixedMeasure::new(40.0);
        m.shrink_font();
        m.shrink_font();
        m.reset_font();
        assert_eq!(m.font_size(), 40.0);
    }

    #[test]
    fn null_catalog_resolves_nothing() {
        let c = NullCatalog;
        assert_eq!(c.item_name(ItemRef(7)), None);
        assert_eq!(c.item_icon(ItemRef(7)), None);
        assert!(!c.face_ready(&FaceRef::new("hero", 0)));
    }
}
