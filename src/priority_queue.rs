//! Addressable binary min-heap.
//!
//! Each key appears at most once; a position map makes decrease-key and
//! arbitrary priority updates O(log n). Ties on priority are broken by heap
//! layout, which callers must not rely on.

use std::hash::Hash;

use rustc_hash::FxHashMap;

pub struct PriorityQueue<K, P> {
    heap: Vec<(K, P)>,
    positions: FxHashMap<K, usize>,
}

impl<K, P> PriorityQueue<K, P>
where
    K: Copy + Eq + Hash,
    P: Copy + PartialOrd,
{
    pub fn new() -> Self {
        PriorityQueue {
            heap: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Inserts `key` with `priority`, or reprioritizes it if already present.
    pub fn push(&mut self, key: K, priority: P) {
        self.update(key, priority);
    }

    /// Sets the priority of `key`, inserting it if absent.
    pub fn update(&mut self, key: K, priority: P) {
        if let Some(&idx) = self.positions.get(&key) {
            let old = self.heap[idx].1;
            self.heap[idx].1 = priority;
            if priority < old {
                self.sift_up(idx);
            } else {
                self.sift_down(idx);
            }
        } else {
            let idx = self.heap.len();
            self.heap.push((key, priority));
            self.positions.insert(key, idx);
            self.sift_up(idx);
        }
    }

    /// Entry with the smallest priority, without removing it.
    pub fn peek(&self) -> Option<(K, P)> {
        self.heap.first().copied()
    }

    /// Removes and returns the entry with the smallest priority.
    pub fn pop(&mut self) -> Option<(K, P)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let (key, priority) = self.heap.pop().unwrap();
        self.positions.remove(&key);
        if !self.heap.is_empty() {
            self.positions.insert(self.heap[0].0, 0);
            self.sift_down(0);
        }
        Some((key, priority))
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.heap[idx].1 < self.heap[parent].1 {
                self.swap_entries(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut smallest = idx;
            if left < self.heap.len() && self.heap[left].1 < self.heap[smallest].1 {
                smallest = left;
            }
            if right < self.heap.len() && self.heap[right].1 < self.heap[smallest].1 {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.swap_entries(idx, smallest);
            idx = smallest;
        }
    }

    fn swap_entries(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.positions.insert(self.heap[i].0, i);
        self.positions.insert(self.heap[j].0, j);
    }
}

impl<K, P> Default for PriorityQueue<K, P>
where
    K: Copy + Eq + Hash,
    P: Copy + PartialOrd,
{
    fn default() -> Self {
        Self::new()
    }
}
