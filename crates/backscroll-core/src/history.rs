#![forbid(unsafe_code)]

//! Bounded history ring buffer.
//!
//! [`HistoryBuffer`] records the last `capacity` messages of a play
//! session. Insertion never fails: at capacity the oldest entry is
//! overwritten. `Text` payloads are tokenized once, at enqueue time,
//! through the buffer's [`EscapeDecoder`].
//!
//! Storage is a classic ring of `capacity + 1` physical slots; the one
//! permanently-unoccupied slot distinguishes "empty" from "full" without a
//! separate length counter.
//!
//! # Invariants
//!
//! 1. At most `capacity` live entries at any time.
//! 2. Identities are strictly increasing and never reused, even across
//!    eviction.
//! 3. [`iter`](HistoryBuffer::iter) always yields oldest→newest regardless
//!    of physical wrap, and never yields the sentinel slot.
//! 4. [`is_full`](HistoryBuffer::is_full) becomes true at the
//!    `capacity`-th insertion and stays true forever (there is no removal).

use crate::message::{FaceRef, ItemRef, Message, MessageId, Token, VarRef};
use crate::tokenize::{ControlCodeDecoder, EscapeDecoder, tokenize};

/// Default number of logical slots.
pub const DEFAULT_CAPACITY: usize = 100;

/// A message as handed in by the host, before tokenization.
///
/// Mirrors [`Message`] except that `Text` still carries the raw annotated
/// string. The structural variants have no raw form; the view layer
/// synthesizes them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMessage {
    /// A completed dialogue message with its raw annotated text.
    Text {
        /// Speaker portrait, if any.
        face: Option<FaceRef>,
        /// Raw annotated body; tokenized at enqueue.
        text: String,
    },
    /// A confirmed choice.
    Choice {
        /// Offered options.
        options: Vec<String>,
        /// Picked index.
        selected: usize,
        /// Whether cancelling was allowed.
        has_cancel: bool,
        /// Whether the player cancelled.
        cancelled: bool,
    },
    /// A confirmed numeric input.
    NumberInput {
        /// Destination variable.
        variable: VarRef,
        /// Entered value.
        value: i64,
    },
    /// A confirmed or cancelled item pick.
    ItemChoice {
        /// Picked item, or `None` on cancel.
        item: Option<ItemRef>,
        /// Destination variable.
        variable: VarRef,
    },
}

#[derive(Debug, Clone)]
struct Slot {
    id: MessageId,
    message: Message,
}

/// Fixed-capacity ring buffer of recorded messages.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<D = ControlCodeDecoder> {
    /// `capacity + 1` physical slots.
    slots: Vec<Option<Slot>>,
    /// Index of the oldest live entry.
    head: usize,
    /// Index of the next write.
    tail: usize,
    next_id: u64,
    decoder: D,
}

impl Default for HistoryBuffer<ControlCodeDecoder> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, ControlCodeDecoder)
    }
}

impl<D: EscapeDecoder> HistoryBuffer<D> {
    /// Create a buffer holding at most `capacity` messages, tokenizing
    /// text through `decoder`. Capacity is clamped to at least 1.
    #[must_use]
    pub fn new(capacity: usize, decoder: D) -> Self {
        let physical = capacity.max(1) + 1;
        Self {
            slots: (0..physical).map(|_| None).collect(),
            head: 0,
            tail: 0,
            next_id: 0,
            decoder,
        }
    }

    /// Logical capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Number of live entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        (self.tail + self.slots.len() - self.head) % self.slots.len()
    }

    /// Whether the buffer holds no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Whether `capacity` messages have ever been inserted. Monotone:
    /// once true, stays true.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Record a message, assigning it the next identity. Never fails; at
    /// capacity the oldest entry is evicted.
    pub fn enqueue(&mut self, raw: RawMessage) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        let message = self.prepare(raw);

        if self.is_full() {
            // Drop the oldest entry; its slot becomes the new sentinel.
            self.slots[self.head] = None;
            self.head = (self.head + 1) % self.slots.len();
        }
        self.slots[self.tail] = Some(Slot { id, message });
        self.tail = (self.tail + 1) % self.slots.len();
        id
    }

    /// Tokenize text payloads; other variants pass through unchanged.
    fn prepare(&self, raw: RawMessage) -> Message {
        match raw {
            RawMessage::Text { face, text } => Message::Text {
                face,
                tokens: tokenize(&text, &self.decoder),
            },
            RawMessage::Choice {
                options,
                selected,
                has_cancel,
                cancelled,
            } => Message::Choice {
                options,
                selected,
                has_cancel,
                cancelled,
            },
            RawMessage::NumberInput { variable, value } => {
                Message::NumberInput { variable, value }
            }
            RawMessage::ItemChoice { item, variable } => {
                Message::ItemChoice { item, variable }
            }
        }
    }

    /// Iterate the live entries oldest→newest. Restartable; the returned
    /// iterator borrows the buffer.
    pub fn iter(&self) -> impl Iterator<Item = (MessageId, &Message)> {
        let physical = self.slots.len();
        (0..self.len()).filter_map(move |i| {
            let slot = self.slots[(self.head + i) % physical].as_ref()?;
            Some((slot.id, &slot.message))
        })
    }

    /// Identity of the most recently inserted entry, if any.
    #[must_use]
    pub fn newest_id(&self) -> Option<MessageId> {
        if self.is_empty() {
            return None;
        }
        let physical = self.slots.len();
        let last = (self.tail + physical - 1) % physical;
        self.slots[last].as_ref().map(|slot| slot.id)
    }

    /// Peek at the tokens of a text entry by identity. Test helper for
    /// hosts that want to assert on tokenization.
    #[must_use]
    pub fn tokens_of(&self, id: MessageId) -> Option<&[Token]> {
        self.iter().find_map(|(entry_id, message)| {
            if entry_id != id {
                return None;
            }
            match message {
                Message::Text { tokens, .. } => Some(tokens.as_slice()),
                _ => None,
            }
        })
    }
}
