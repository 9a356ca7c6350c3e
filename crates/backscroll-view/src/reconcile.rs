#![forbid(unsafe_code)]

//! Viewport reconciliation and edge-fade math.
//!
//! Each refresh matches the live buffer contents against the cached entry
//! views by message identity and reports the outcome as an explicit
//! [`Reconciliation`]: which views were created, which were retained at a
//! new position, and which were destroyed. Geometry for a retained view is
//! reused, not recomputed; layout runs only for newly appeared messages.
//!
//! # Invariants
//!
//! 1. After `refresh`, the cache holds exactly one view per live buffer
//!    entry and nothing else.
//! 2. Two refreshes without an intervening enqueue produce identical
//!    positions and report no structural change on the second call.
//! 3. The divider paired with the newest entry is suppressed and excluded
//!    from the content height.
//! 4. Content height is never below the viewport height.

use std::collections::hash_map::Entry;

use ahash::{AHashMap, AHashSet};
use backscroll_core::{EscapeDecoder, HistoryBuffer, Message, MessageId};
use backscroll_layout::{AssetCatalog, DrawPlan, LayoutConfig, TextMeasure, layout_message};

// ============================================================================
// Entry Views
// ============================================================================

/// Cached per-message projection: reusable geometry plus the baseline
/// offsets assigned by the most recent refresh.
#[derive(Debug, Clone)]
pub struct EntryView {
    /// Identity of the projected message.
    pub id: MessageId,
    /// Reusable draw geometry, relative to the entry's top-left corner.
    pub plan: DrawPlan,
    /// Baseline vertical offset within the scrolled content.
    pub base_y: f32,
    /// Baseline offset of the paired divider.
    pub divider_base_y: f32,
    /// Whether the paired divider is hidden (newest entry only).
    pub divider_suppressed: bool,
}

/// Outcome of one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Identities whose views were created this refresh, oldest first.
    pub created: Vec<MessageId>,
    /// Identities whose views were reused, oldest first.
    pub retained: Vec<MessageId>,
    /// Identities evicted from the buffer since the previous refresh.
    pub destroyed: Vec<MessageId>,
    /// Total scrollable content height, viewport-floored.
    pub content_height: f32,
    /// Whether any view was created or destroyed.
    pub structural_change: bool,
}

// ============================================================================
// View Cache
// ============================================================================

/// Identity-keyed cache of entry views plus the structural sentinel
/// geometry shared by every refresh.
#[derive(Debug, Clone, Default)]
pub struct ViewCache {
    views: AHashMap<MessageId, EntryView>,
    order: Vec<MessageId>,
    ellipsis_visible: bool,
    ellipsis_base_y: f32,
    divider_plan: DrawPlan,
    ellipsis_plan: DrawPlan,
}

impl ViewCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entry views.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether the cache holds no views.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Cached view for `id`, if its message is still live.
    #[inline]
    #[must_use]
    pub fn get(&self, id: MessageId) -> Option<&EntryView> {
        self.views.get(&id)
    }

    /// Identities in display order, oldest first, from the last refresh.
    #[inline]
    #[must_use]
    pub fn order(&self) -> &[MessageId] {
        &self.order
    }

    /// Whether the truncation sentinel is shown above the oldest entry.
    #[inline]
    #[must_use]
    pub fn ellipsis_visible(&self) -> bool {
        self.ellipsis_visible
    }

    /// Baseline offset of the truncation sentinel.
    #[inline]
    #[must_use]
    pub fn ellipsis_base_y(&self) -> f32 {
        self.ellipsis_base_y
    }

    /// Shared divider geometry.
    #[inline]
    #[must_use]
    pub fn divider_plan(&self) -> &DrawPlan {
        &self.divider_plan
    }

    /// Shared truncation sentinel geometry.
    #[inline]
    #[must_use]
    pub fn ellipsis_plan(&self) -> &DrawPlan {
        &self.ellipsis_plan
    }

    /// Reconcile the cache against the buffer and reassign baselines.
    ///
    /// Walks oldest→newest: the sentinel first when the buffer is full,
    /// then each entry followed by its divider. New messages are laid out;
    /// retained ones keep their plan and only move. Views whose message
    /// was evicted are dropped.
    pub fn refresh<D, M, A>(
        &mut self,
        buffer: &HistoryBuffer<D>,
        config: &LayoutConfig,
        measure: &mut M,
        catalog: &A,
        viewport_height: f32,
    ) -> Reconciliation
    where
        D: EscapeDecoder,
        M: TextMeasure,
        A: AssetCatalog,
    {
        self.divider_plan = layout_message(&Message::Divider, config, measure, catalog);
        self.ellipsis_plan = layout_message(&Message::Ellipsis, config, measure, catalog);
        let divider_height = self.divider_plan.height;
        let pad = config.padding;

        let mut stale: AHashSet<MessageId> = self.views.keys().copied().collect();
        let mut created = Vec::new();
        let mut retained = Vec::new();
        let mut y = 0.0;

        self.ellipsis_visible = buffer.is_full();
        if self.ellipsis_visible {
            self.ellipsis_base_y = y + pad;
            y += self.ellipsis_plan.height;
        }

        self.order.clear();
        let mut last_id = None;
        for (id, message) in buffer.iter() {
            let view = match self.views.entry(id) {
                Entry::Occupied(slot) => {
                    stale.remove(&id);
                    retained.push(id);
                    slot.into_mut()
                }
                Entry::Vacant(slot) => {
                    created.push(id);
                    slot.insert(EntryView {
                        id,
                        plan: layout_message(message, config, measure, catalog),
                        base_y: 0.0,
                        divider_base_y: 0.0,
                        divider_suppressed: false,
                    })
                }
            };
            view.base_y = y + pad;
            y += view.plan.height;
            view.divider_base_y = y + pad;
            view.divider_suppressed = false;
            y += divider_height;
            self.order.push(id);
            last_id = Some(id);
        }

        let mut destroyed: Vec<MessageId> = stale.into_iter().collect();
        destroyed.sort_unstable();
        for id in &destroyed {
            self.views.remove(id);
        }

        // No trailing rule after the newest entry.
        if let Some(last) = last_id {
            if let Some(view) = self.views.get_mut(&last) {
                view.divider_suppressed = true;
            }
            y -= divider_height;
        }

        let content_height = (y + 2.0 * pad).max(viewport_height);
        let structural_change = !created.is_empty() || !destroyed.is_empty();
        Reconciliation {
            created,
            retained,
            destroyed,
            content_height,
            structural_change,
        }
    }
}

// ============================================================================
// Edge Fade
// ============================================================================

/// Fade factor in `[0, 1]` for a vertical span `[base_y, base_y + height]`
/// against the visible band `[scroll_y, scroll_y + viewport_height]`.
///
/// Fully outside the band is 0, fully inside is 1, and a span straddling
/// an edge fades by the fraction of it still inside. The factor varies
/// continuously as the band moves.
#[must_use]
pub fn fade_factor(base_y: f32, height: f32, scroll_y: f32, viewport_height: f32) -> f32 {
    if height <= 0.0 {
        let inside = base_y >= scroll_y && base_y <= scroll_y + viewport_height;
        return if inside { 1.0 } else { 0.0 };
    }
    if base_y + height < scroll_y {
        0.0
    } else if base_y < scroll_y {
        1.0 - (scroll_y - base_y) / height
    } else if base_y + height < scroll_y + viewport_height {
        1.0
    } else if base_y < scroll_y + viewport_height {
        (scroll_y + viewport_height - base_y) / height
    } else {
        0.0
    }
}
