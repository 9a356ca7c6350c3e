#![forbid(unsafe_code)]

//! Message and token data model.
//!
//! A [`Message`] is one recorded history entry. `Text` payloads carry a
//! pre-tokenized command sequence (see [`crate::tokenize`]); all other
//! variants are plain records of a confirmed interaction. The structural
//! `Divider` and `Ellipsis` variants are never stored in the history buffer;
//! the view layer synthesizes them around real entries.

/// Identity of a message for the lifetime of its buffer.
///
/// Strictly increasing, assigned at enqueue, never reused even after the
/// underlying entry has been evicted from the ring. The counter is a bare
/// `u64` and is not wrapped: at one enqueue per millisecond it outlasts any
/// realistic session by a comfortable nine orders of magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

/// Palette index for text coloring.
///
/// The engine never interprets the index; the host's drawing surface maps
/// it to a concrete color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorId(pub u8);

/// Face portrait reference: sheet name plus cell index within the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FaceRef {
    /// Name of the portrait sheet asset.
    pub name: String,
    /// Cell index within the sheet.
    pub index: usize,
}

impl FaceRef {
    /// Create a face reference.
    #[must_use]
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Item table reference, resolved through the host's asset catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef(pub u32);

/// Game variable reference. Recorded for provenance; the viewer never
/// dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarRef(pub u32);

/// One drawable command produced by tokenizing an annotated text message.
///
/// Tokens are immutable once produced and their order mirrors source
/// character order exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text run. Never empty.
    Run(String),
    /// Explicit line break.
    Newline,
    /// Switch the active text color for subsequent runs.
    Color(ColorId),
    /// Inline icon by index.
    Icon(u32),
    /// Grow the active font one step for subsequent tokens.
    FontGrow,
    /// Shrink the active font one step for subsequent tokens.
    FontShrink,
}

/// A recorded history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A completed dialogue message.
    Text {
        /// Speaker portrait, if the dialogue showed one.
        face: Option<FaceRef>,
        /// Tokenized body.
        tokens: Vec<Token>,
    },
    /// A confirmed choice.
    Choice {
        /// The options that were offered.
        options: Vec<String>,
        /// Index of the option the player picked.
        selected: usize,
        /// Whether cancelling was allowed (adds a "(cancel)" pseudo-option).
        has_cancel: bool,
        /// Whether the player cancelled instead of picking an option.
        cancelled: bool,
    },
    /// A confirmed numeric input.
    NumberInput {
        /// Variable the input was stored into.
        variable: VarRef,
        /// The entered value.
        value: i64,
    },
    /// A confirmed (or cancelled) item pick.
    ItemChoice {
        /// The picked item, or `None` if the pick was cancelled.
        item: Option<ItemRef>,
        /// Variable the item id was stored into.
        variable: VarRef,
    },
    /// Structural: thin separator rule between entries.
    Divider,
    /// Structural: "older history truncated" sentinel.
    Ellipsis,
}

impl Message {
    /// Whether this is one of the structural variants the view layer
    /// synthesizes (never stored in the buffer).
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Divider | Self::Ellipsis)
    }
}
