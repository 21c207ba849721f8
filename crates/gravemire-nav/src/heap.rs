//! Indexed binary min-heap for the A* open set.
//!
//! A plain binary heap cannot re-prioritize an entry that is already queued,
//! which A* needs whenever it finds a cheaper route to a frontier cell. This
//! heap keeps a cell-to-slot map in sync across every swap so membership
//! tests are O(1) and priority updates are O(log n).

use ahash::AHashMap;
use gravemire_common::CellCoord;

/// Min-heap over `(cell, priority)` pairs with O(1) membership lookup.
#[derive(Debug, Default)]
pub struct IndexedMinHeap {
    entries: Vec<(CellCoord, f32)>,
    slots: AHashMap<CellCoord, usize>,
}

impl IndexedMinHeap {
    /// Creates an empty heap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the heap is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks whether a cell is queued.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.slots.contains_key(&cell)
    }

    /// Removes all entries, keeping allocations for reuse.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }

    /// Inserts a cell with the given priority.
    ///
    /// Returns `false` without modifying the heap if the cell is already
    /// queued; use [`update_priority`](Self::update_priority) for that case.
    pub fn push(&mut self, cell: CellCoord, priority: f32) -> bool {
        if self.slots.contains_key(&cell) {
            return false;
        }
        let i = self.entries.len();
        self.entries.push((cell, priority));
        self.slots.insert(cell, i);
        self.sift_up(i);
        true
    }

    /// Re-prioritizes a queued cell, or inserts it if absent.
    pub fn update_priority(&mut self, cell: CellCoord, priority: f32) {
        match self.slots.get(&cell) {
            Some(&i) => {
                let old = self.entries[i].1;
                self.entries[i].1 = priority;
                if priority < old {
                    self.sift_up(i);
                } else {
                    self.sift_down(i);
                }
            }
            None => {
                self.push(cell, priority);
            }
        }
    }

    /// Removes and returns the minimum-priority cell.
    pub fn pop(&mut self) -> Option<CellCoord> {
        if self.entries.is_empty() {
            return None;
        }
        let root = self.entries[0].0;
        let last = self.entries.len() - 1;
        self.swap(0, last);
        self.entries.pop();
        self.slots.remove(&root);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(root)
    }

    /// Returns the minimum-priority cell without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<CellCoord> {
        self.entries.first().map(|&(cell, _)| cell)
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.entries[i].1 < self.entries[parent].1 {
                self.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;

            if left < self.entries.len() && self.entries[left].1 < self.entries[smallest].1 {
                smallest = left;
            }
            if right < self.entries.len() && self.entries[right].1 < self.entries[smallest].1 {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.entries.swap(i, j);
        self.slots.insert(self.entries[i].0, i);
        self.slots.insert(self.entries[j].0, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cell(n: i32) -> CellCoord {
        CellCoord::new(n, 0)
    }

    #[test]
    fn test_push_pop_order() {
        let mut heap = IndexedMinHeap::new();
        assert!(heap.push(cell(1), 5.0));
        assert!(heap.push(cell(2), 1.0));
        assert!(heap.push(cell(3), 3.0));

        assert_eq!(heap.pop(), Some(cell(2)));
        assert_eq!(heap.pop(), Some(cell(3)));
        assert_eq!(heap.pop(), Some(cell(1)));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_duplicate_push_rejected() {
        let mut heap = IndexedMinHeap::new();
        assert!(heap.push(cell(1), 5.0));
        assert!(!heap.push(cell(1), 1.0));
        assert_eq!(heap.len(), 1);
        // Original priority untouched
        heap.push(cell(2), 3.0);
        assert_eq!(heap.pop(), Some(cell(2)));
    }

    #[test]
    fn test_decrease_priority() {
        let mut heap = IndexedMinHeap::new();
        heap.push(cell(1), 10.0);
        heap.push(cell(2), 5.0);
        heap.update_priority(cell(1), 1.0);
        assert_eq!(heap.pop(), Some(cell(1)));
        assert_eq!(heap.pop(), Some(cell(2)));
    }

    #[test]
    fn test_increase_priority() {
        let mut heap = IndexedMinHeap::new();
        heap.push(cell(1), 1.0);
        heap.push(cell(2), 5.0);
        heap.update_priority(cell(1), 10.0);
        assert_eq!(heap.pop(), Some(cell(2)));
        assert_eq!(heap.pop(), Some(cell(1)));
    }

    #[test]
    fn test_update_absent_inserts() {
        let mut heap = IndexedMinHeap::new();
        heap.update_priority(cell(1), 2.0);
        assert!(heap.contains(cell(1)));
        assert_eq!(heap.pop(), Some(cell(1)));
    }

    #[test]
    fn test_contains_tracks_membership() {
        let mut heap = IndexedMinHeap::new();
        heap.push(cell(1), 1.0);
        heap.push(cell(2), 2.0);
        assert!(heap.contains(cell(1)));
        heap.pop();
        assert!(!heap.contains(cell(1)));
        assert!(heap.contains(cell(2)));
    }

    #[test]
    fn test_clear_keeps_working() {
        let mut heap = IndexedMinHeap::new();
        heap.push(cell(1), 1.0);
        heap.clear();
        assert!(heap.is_empty());
        assert!(!heap.contains(cell(1)));
        assert!(heap.push(cell(1), 2.0));
        assert_eq!(heap.pop(), Some(cell(1)));
    }

    #[test]
    fn test_peek() {
        let mut heap = IndexedMinHeap::new();
        assert_eq!(heap.peek(), None);
        heap.push(cell(4), 4.0);
        heap.push(cell(1), 1.0);
        assert_eq!(heap.peek(), Some(cell(1)));
        assert_eq!(heap.len(), 2);
    }

    proptest! {
        // Pops must come out in non-decreasing priority order for any
        // sequence of inserts and priority updates.
        #[test]
        fn prop_pop_is_sorted(ops in prop::collection::vec((0i32..64, 0u32..1000), 1..200)) {
            let mut heap = IndexedMinHeap::new();
            let mut expected = std::collections::HashMap::new();
            for (key, pri) in ops {
                let c = cell(key);
                let p = pri as f32;
                if heap.contains(c) {
                    heap.update_priority(c, p);
                } else {
                    prop_assert!(heap.push(c, p));
                }
                expected.insert(c, p);
            }
            prop_assert_eq!(heap.len(), expected.len());

            let mut last = f32::NEG_INFINITY;
            while let Some(c) = heap.peek() {
                let p = expected.remove(&c).expect("popped unknown cell");
                prop_assert_eq!(heap.pop(), Some(c));
                prop_assert!(p >= last);
                last = p;
            }
            prop_assert!(expected.is_empty());
        }
    }
}
