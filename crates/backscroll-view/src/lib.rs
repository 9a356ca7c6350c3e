#![forbid(unsafe_code)]

//! Viewport layer of the backscroll message history viewer.
//!
//! Owns everything between the recorded history and the host's screen:
//! the Closed → Opening → Open → Closing phase machine with its discrete
//! opacity ramp, the identity-keyed view cache reconciled against the
//! buffer each refresh, edge-fade compositing over the visible band, and
//! the input bindings that give the overlay exclusive focus while open.
//!
//! The single entry point for hosts is [`ReplayViewer`]: feed it records
//! via `enqueue`, call `tick` once per frame with an [`InputSource`]
//! snapshot, and draw the [`Frame`] it composites.
//!
//! Structured logging is available behind the `tracing` feature.

pub mod input;
pub mod phase;
pub mod reconcile;
pub mod viewer;

pub use input::{Control, InputSource, ViewerConfig};
pub use phase::{OpenState, ViewerPhase};
pub use reconcile::{EntryView, Reconciliation, ViewCache, fade_factor};
pub use viewer::{Frame, Placed, PlacedKind, ReplayViewer};
