//! Viewport tracker: picks the single focused item from a viewport snapshot.
//!
//! Pure functions only. The result depends on the snapshot and the item list
//! and nothing else, so it is safe to evaluate on every scroll frame and
//! inside derived computations.
//!
//! # Precedence
//!
//! Entries whose index falls outside the item list (a stale snapshot racing a
//! list update) are dropped first. Then, first match wins:
//!
//! 1. [`FocusRule::ListStart`]: the first entry is index 0 and starts exactly
//!    at the viewport start.
//! 2. [`FocusRule::ListEnd`]: the last entry is the last item and its trailing
//!    edge is within the viewport end.
//! 3. [`FocusRule::CenterNearest`]: the entry whose midpoint is closest to the
//!    viewport midpoint, lowest index on ties.

use crate::model::{FeedItem, ItemId, ViewportSnapshot, VisibleEntry};

/// Which precedence rule selected the focused item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusRule {
    /// List scrolled to the very top.
    ListStart,
    /// Last item fully visible.
    ListEnd,
    /// Closest to the viewport midpoint.
    CenterNearest,
}

/// Index of the focused item and the rule that picked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusDecision {
    /// Index into the item list.
    pub index: usize,
    /// Rule that matched.
    pub rule: FocusRule,
}

/// Decide the focused index for a list of `item_count` items.
///
/// Returns `None` when there are no items or no valid visible entries.
///
/// ```
/// use feedplay::model::{ViewportSnapshot, VisibleEntry};
/// use feedplay::tracker::{focus_decision, FocusRule};
///
/// let snapshot = ViewportSnapshot::new(
///     vec![VisibleEntry::new(0, 0, 300), VisibleEntry::new(1, 300, 300)],
///     0,
///     500,
///     5,
/// );
/// let decision = focus_decision(&snapshot, 5).unwrap();
/// assert_eq!(decision.index, 0);
/// assert_eq!(decision.rule, FocusRule::ListStart);
/// ```
pub fn focus_decision(snapshot: &ViewportSnapshot, item_count: usize) -> Option<FocusDecision> {
    if item_count == 0 {
        return None;
    }

    let valid: Vec<&VisibleEntry> = snapshot
        .entries()
        .iter()
        .filter(|entry| entry.index < item_count)
        .collect();

    let first = valid.first()?;
    if first.index == 0 && first.offset == snapshot.viewport_start() {
        return Some(FocusDecision {
            index: 0,
            rule: FocusRule::ListStart,
        });
    }

    let last = valid.last()?;
    if last.index == item_count - 1 && last.end() <= i64::from(snapshot.viewport_end()) {
        return Some(FocusDecision {
            index: last.index,
            rule: FocusRule::ListEnd,
        });
    }

    center_nearest(snapshot, item_count).map(|index| FocusDecision {
        index,
        rule: FocusRule::CenterNearest,
    })
}

/// Index of the valid entry whose midpoint is closest to the viewport
/// midpoint, lowest index on ties.
///
/// ```
/// use feedplay::model::{ViewportSnapshot, VisibleEntry};
/// use feedplay::tracker::center_nearest;
///
/// let snapshot = ViewportSnapshot::new(
///     vec![VisibleEntry::new(0, 0, 100), VisibleEntry::new(1, 100, 100)],
///     50,
///     150,
///     4,
/// );
/// assert_eq!(center_nearest(&snapshot, 4), Some(0));
/// ```
pub fn center_nearest(snapshot: &ViewportSnapshot, item_count: usize) -> Option<usize> {
    let midpoint = snapshot.midpoint();
    snapshot
        .entries()
        .iter()
        .filter(|entry| entry.index < item_count)
        .min_by_key(|entry| ((entry.midpoint() - midpoint).abs(), entry.index))
        .map(|entry| entry.index)
}

/// Compute the focused item for `snapshot` over `items`.
///
/// Empty `items` or an empty snapshot yield `None` (no focus).
pub fn compute_focused_item<'a>(
    snapshot: &ViewportSnapshot,
    items: &'a [FeedItem],
) -> Option<&'a FeedItem> {
    focus_decision(snapshot, items.len()).and_then(|decision| items.get(decision.index))
}

/// Whether the item with `id` is among the visible entries of `snapshot`.
///
/// Used by reference (tap-to-play) feeds to notice the playing item leaving
/// the viewport. Out-of-range entries are ignored.
pub fn visible_area_contains(snapshot: &ViewportSnapshot, items: &[FeedItem], id: &ItemId) -> bool {
    snapshot
        .entries()
        .iter()
        .filter_map(|entry| items.get(entry.index))
        .any(|item| item.id() == id)
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
