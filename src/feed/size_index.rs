//! SizeIndex - O(log n) prefix sums and lower_bound via Fenwick tree
//!
//! Cumulative item sizes for a feed, used to find the first visible item for
//! a scroll offset without walking the whole list.
//!
//! # Complexity
//!
//! - `prefix_sum`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `push`: O(log n) amortized
//! - `total`: O(log n)

/// Fenwick tree over item sizes.
#[derive(Debug, Clone, Default)]
pub struct SizeIndex {
    /// Fenwick tree backing storage (1-indexed internally, 0-indexed API)
    tree: Vec<isize>,
    /// Raw sizes, kept to rebuild the tree when storage grows.
    sizes: Vec<usize>,
}

impl SizeIndex {
    /// Creates an empty index with room for `capacity` items.
    ///
    /// ```
    /// # use feedplay::feed::size_index::SizeIndex;
    /// let index = SizeIndex::new(100);
    /// assert_eq!(index.len(), 0);
    /// assert_eq!(index.total(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity],
            sizes: Vec::with_capacity(capacity),
        }
    }

    /// Builds an index from a sequence of sizes.
    pub fn from_sizes(sizes: impl IntoIterator<Item = usize>) -> Self {
        let sizes: Vec<usize> = sizes.into_iter().collect();
        let mut index = Self::new(sizes.len());
        for size in sizes {
            index.push(size);
        }
        index
    }

    /// Size of the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn size(&self, index: usize) -> usize {
        self.sizes[index]
    }

    /// Cumulative size up to and including `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// ```
    /// # use feedplay::feed::size_index::SizeIndex;
    /// let index = SizeIndex::from_sizes([3, 4, 5]);
    /// assert_eq!(index.prefix_sum(0), 3);
    /// assert_eq!(index.prefix_sum(1), 7);
    /// assert_eq!(index.prefix_sum(2), 12);
    /// ```
    pub fn prefix_sum(&self, index: usize) -> usize {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        let sum = fenwick::array::prefix_sum(&self.tree, index);
        sum.max(0) as usize
    }

    /// Leading edge of the item at `index` (sum of all sizes before it).
    pub fn start_of(&self, index: usize) -> usize {
        if index == 0 {
            0
        } else {
            self.prefix_sum(index - 1)
        }
    }

    /// First index where `prefix_sum(index) > value`, i.e. the item covering
    /// pixel `value`. `None` if `value >= total()`.
    ///
    /// ```
    /// # use feedplay::feed::size_index::SizeIndex;
    /// let index = SizeIndex::from_sizes([10, 20, 15]);
    /// assert_eq!(index.lower_bound(0), Some(0));
    /// assert_eq!(index.lower_bound(10), Some(1));
    /// assert_eq!(index.lower_bound(30), Some(2));
    /// assert_eq!(index.lower_bound(45), None);
    /// ```
    pub fn lower_bound(&self, value: usize) -> Option<usize> {
        if self.is_empty() {
            return None;
        }

        // Item i covers [prefix_sum(i-1), prefix_sum(i))
        let mut left = 0;
        let mut right = self.len();

        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > value {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (left < self.len()).then_some(left)
    }

    /// Total size of all items.
    pub fn total(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.prefix_sum(self.len() - 1)
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// True if the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Appends an item. Grows and rebuilds the tree when storage runs out.
    pub fn push(&mut self, size: usize) {
        let idx = self.sizes.len();
        self.sizes.push(size);

        if idx >= self.tree.len() {
            self.rebuild(self.tree.len().max(1) * 2);
        } else {
            fenwick::array::update(&mut self.tree, idx, size as isize);
        }
    }

    fn rebuild(&mut self, capacity: usize) {
        self.tree = vec![0; capacity.max(self.sizes.len())];
        for (i, &size) in self.sizes.iter().enumerate() {
            fenwick::array::update(&mut self.tree, i, size as isize);
        }
    }
}
