//! Pixel layout of a vertical feed.
//!
//! Items are stacked without gaps; item `i` occupies
//! `[start_of(i), start_of(i) + size(i))` in content coordinates. A viewport of
//! length `len` scrolled to `scroll` sees content `[scroll, scroll + len)`, and
//! snapshots are reported in viewport coordinates (viewport start = 0).

use super::size_index::SizeIndex;
use crate::model::{ViewportSnapshot, VisibleEntry};

/// Per-item sizes of a feed.
#[derive(Debug, Clone, Default)]
pub struct FeedLayout {
    index: SizeIndex,
}

impl FeedLayout {
    /// Layout with explicit per-item sizes.
    pub fn new(sizes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            index: SizeIndex::from_sizes(sizes.into_iter().map(|size| size as usize)),
        }
    }

    /// Layout of `count` items of the same size.
    pub fn uniform(count: usize, size: u32) -> Self {
        Self::new(std::iter::repeat(size).take(count))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True for an empty feed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Append an item (pagination).
    pub fn push(&mut self, size: u32) {
        self.index.push(size as usize);
    }

    /// Total content length.
    pub fn content_length(&self) -> u64 {
        self.index.total() as u64
    }

    /// Largest scroll offset that still fills the viewport.
    pub fn max_scroll(&self, viewport_len: u32) -> u64 {
        self.content_length().saturating_sub(u64::from(viewport_len))
    }

    /// Clamp `scroll` into `[0, max_scroll]`.
    pub fn clamp_scroll(&self, scroll: i64, viewport_len: u32) -> u64 {
        let max = self.max_scroll(viewport_len);
        u64::try_from(scroll.max(0)).unwrap_or(0).min(max)
    }

    /// Snapshot of the items visible at `scroll` in a viewport of
    /// `viewport_len` pixels.
    ///
    /// ```
    /// use feedplay::feed::FeedLayout;
    ///
    /// let layout = FeedLayout::uniform(10, 100);
    /// let snapshot = layout.snapshot(150, 250);
    /// let indices: Vec<usize> = snapshot.entries().iter().map(|e| e.index).collect();
    /// assert_eq!(indices, vec![1, 2, 3]);
    /// assert_eq!(snapshot.entries()[0].offset, -50);
    /// ```
    pub fn snapshot(&self, scroll: u64, viewport_len: u32) -> ViewportSnapshot {
        let viewport_end = i32::try_from(viewport_len).unwrap_or(i32::MAX);
        let mut entries = Vec::new();

        if viewport_len > 0 {
            let scroll_px = usize::try_from(scroll).unwrap_or(usize::MAX);
            let window_end = scroll.saturating_add(u64::from(viewport_len));
            if let Some(first) = self.index.lower_bound(scroll_px) {
                for index in first..self.len() {
                    let start = self.index.start_of(index) as u64;
                    if start >= window_end {
                        break;
                    }
                    let offset = start as i64 - scroll as i64;
                    let size = u32::try_from(self.index.size(index)).unwrap_or(u32::MAX);
                    if size == 0 {
                        continue;
                    }
                    entries.push(VisibleEntry::new(
                        index,
                        i32::try_from(offset).unwrap_or(i32::MIN),
                        size,
                    ));
                }
            }
        }

        ViewportSnapshot::new(entries, 0, viewport_end, self.len())
    }
}
