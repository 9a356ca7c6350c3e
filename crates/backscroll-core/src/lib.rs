#![forbid(unsafe_code)]

//! Core data model and state for the backscroll message history viewer:
//! message records, the escape-aware tokenizer, the bounded history ring
//! buffer, and the momentum scroller that drives inertial scrolling.
//!
//! Nothing in this crate talks to a rendering surface or an input device;
//! those collaborators live behind the traits in `backscroll-layout` and
//! `backscroll-view`.

pub mod history;
pub mod message;
pub mod scroller;
pub mod tokenize;

pub use history::{DEFAULT_CAPACITY, HistoryBuffer, RawMessage};
pub use message::{ColorId, FaceRef, ItemRef, Message, MessageId, Token, VarRef};
pub use scroller::{MomentumScroller, ScrollerConfig};
pub use tokenize::{ControlCodeDecoder, DecodedEscape, EscapeCode, EscapeDecoder, tokenize};
