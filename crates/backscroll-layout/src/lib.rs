#![forbid(unsafe_code)]

//! Per-entry layout for the message history viewer.
//!
//! Turns one tokenized [`Message`](backscroll_core::Message) into a
//! [`DrawPlan`]: an ordered list of primitive draw operations plus the
//! measured total height. Measurement and drawing come out of the same
//! pass over the message, so the height a host reserves and the geometry
//! it draws can never disagree.
//!
//! The crate knows nothing about fonts or bitmaps. Width measurement and
//! asset resolution go through the [`TextMeasure`] and [`AssetCatalog`]
//! traits; [`FixedMeasure`] is a deterministic built-in for headless hosts
//! and tests.

pub mod entry;
pub mod plan;
pub mod surface;

pub use entry::{CANCEL_LABEL, LayoutConfig, layout_message};
pub use plan::{DrawOp, DrawPlan};
pub use surface::{AssetCatalog, FixedMeasure, NullCatalog, TextMeasure};
