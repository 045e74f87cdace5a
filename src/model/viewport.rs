//! Viewport snapshots produced by the scroll/layout collaborator.
//!
//! All pixel values share one coordinate space: entry offsets and the
//! viewport bounds are measured along the scroll axis from the same origin,
//! so an entry that starts exactly at the viewport start has
//! `offset == viewport_start`.

/// One visible list entry in a viewport snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibleEntry {
    /// Index into the feed's item list.
    pub index: usize,
    /// Leading edge along the scroll axis. May precede `viewport_start`
    /// for a partially scrolled-off entry.
    pub offset: i32,
    /// Extent along the scroll axis.
    pub size: u32,
}

impl VisibleEntry {
    /// Create a visible entry.
    pub fn new(index: usize, offset: i32, size: u32) -> Self {
        Self {
            index,
            offset,
            size,
        }
    }

    /// Trailing edge (`offset + size`).
    pub fn end(&self) -> i64 {
        i64::from(self.offset) + i64::from(self.size)
    }

    /// Midpoint (`offset + size / 2`, integer division).
    pub fn midpoint(&self) -> i64 {
        i64::from(self.offset) + i64::from(self.size / 2)
    }
}

/// Ordered visible entries plus viewport bounds and total item count.
///
/// Ephemeral: recomputed on every scroll-position change, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewportSnapshot {
    entries: Vec<VisibleEntry>,
    viewport_start: i32,
    viewport_end: i32,
    total_items: usize,
}

impl ViewportSnapshot {
    /// Create a snapshot. `entries` must be ordered by index.
    ///
    /// # Panics
    /// In debug builds, panics if `viewport_start > viewport_end`.
    pub fn new(
        entries: Vec<VisibleEntry>,
        viewport_start: i32,
        viewport_end: i32,
        total_items: usize,
    ) -> Self {
        debug_assert!(
            viewport_start <= viewport_end,
            "viewport start {viewport_start} is after viewport end {viewport_end}"
        );
        Self {
            entries,
            viewport_start,
            viewport_end,
            total_items,
        }
    }

    /// Visible entries in index order.
    pub fn entries(&self) -> &[VisibleEntry] {
        &self.entries
    }

    /// Leading pixel bound of the viewport.
    pub fn viewport_start(&self) -> i32 {
        self.viewport_start
    }

    /// Trailing pixel bound of the viewport.
    pub fn viewport_end(&self) -> i32 {
        self.viewport_end
    }

    /// Total item count the layout was computed for.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Viewport midpoint (`(start + end) / 2`, integer division).
    pub fn midpoint(&self) -> i64 {
        (i64::from(self.viewport_start) + i64::from(self.viewport_end)) / 2
    }

    /// True when no layout has happened yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Host (screen / application) lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Host came to the foreground.
    Foregrounded,
    /// Host went to the background.
    Backgrounded,
    /// Host is being torn down.
    Destroyed,
}

/// Foreground/background state tracked by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HostState {
    /// Visible to the user; loaded items play.
    #[default]
    Foreground,
    /// Hidden; loaded items stay paused.
    Background,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_midpoint_uses_integer_half_size() {
        let entry = VisibleEntry::new(0, 10, 25);
        assert_eq!(entry.midpoint(), 22);
        assert_eq!(entry.end(), 35);
    }

    #[test]
    fn entry_with_negative_offset() {
        let entry = VisibleEntry::new(3, -40, 100);
        assert_eq!(entry.midpoint(), 10);
        assert_eq!(entry.end(), 60);
    }

    #[test]
    fn snapshot_midpoint() {
        let snapshot = ViewportSnapshot::new(Vec::new(), 50, 350, 0);
        assert_eq!(snapshot.midpoint(), 200);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn default_snapshot_is_empty() {
        let snapshot = ViewportSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_items(), 0);
    }

    #[test]
    #[should_panic(expected = "is after viewport end")]
    #[cfg(debug_assertions)]
    fn new_panics_when_bounds_inverted() {
        ViewportSnapshot::new(Vec::new(), 10, 5, 0);
    }

    #[test]
    fn host_state_defaults_to_foreground() {
        assert_eq!(HostState::default(), HostState::Foreground);
    }
}
