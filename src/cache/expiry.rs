//! Expiry Index Module
//!
//! Binary min-heap of expiration deadlines with stable handles.
//!
//! Each inserted deadline gets an [`ExpiryHandle`] that stays valid until it
//! is removed, no matter how the heap reorders itself. The index keeps a
//! handle -> heap position table and rewrites it on every swap, so removal
//! by handle never has to search.

use tokio::time::Instant;

/// Marks a handle slot that is not currently in the heap.
const VACANT: usize = usize::MAX;

// == Expiry Handle ==
/// Opaque position handle into an [`ExpiryIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpiryHandle(usize);

#[derive(Debug)]
struct HeapNode<K> {
    expires_at: Instant,
    key: K,
    handle: usize,
}

// == Expiry Index ==
/// Orders keys by deadline; the soonest deadline sits at the root.
#[derive(Debug)]
pub struct ExpiryIndex<K> {
    heap: Vec<HeapNode<K>>,
    /// Handle slot -> heap position, or VACANT
    positions: Vec<usize>,
    /// Recycled handle slots
    free: Vec<usize>,
}

impl<K> Default for ExpiryIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ExpiryIndex<K> {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            positions: Vec::new(),
            free: Vec::new(),
        }
    }

    // == Insert ==
    /// Adds a deadline for `key` and returns its handle. O(log n).
    pub fn insert(&mut self, expires_at: Instant, key: K) -> ExpiryHandle {
        let pos = self.heap.len();
        let slot = match self.free.pop() {
            Some(slot) => {
                self.positions[slot] = pos;
                slot
            }
            None => {
                self.positions.push(pos);
                self.positions.len() - 1
            }
        };

        self.heap.push(HeapNode {
            expires_at,
            key,
            handle: slot,
        });
        self.sift_up(pos);

        ExpiryHandle(slot)
    }

    // == Peek ==
    /// Returns the soonest deadline and its key without removing it. O(1).
    pub fn peek(&self) -> Option<(Instant, &K)> {
        self.heap.first().map(|node| (node.expires_at, &node.key))
    }

    // == Remove ==
    /// Removes the deadline behind `handle`, returning it with its key. O(log n).
    ///
    /// # Panics
    /// Panics if the handle was already removed.
    pub fn remove(&mut self, handle: ExpiryHandle) -> (Instant, K) {
        let pos = self.positions[handle.0];
        assert_ne!(pos, VACANT, "expiry handle removed twice");

        let node = self.heap.swap_remove(pos);
        self.positions[handle.0] = VACANT;
        self.free.push(handle.0);

        // The former last node now sits at `pos` and may belong above or below it
        if pos < self.heap.len() {
            self.positions[self.heap[pos].handle] = pos;
            let pos = self.sift_up(pos);
            self.sift_down(pos);
        }

        (node.expires_at, node.key)
    }

    // == Length ==
    /// Returns the number of deadlines held.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the deadline and key behind a live handle.
    #[cfg(test)]
    pub(crate) fn get(&self, handle: ExpiryHandle) -> Option<(Instant, &K)> {
        let pos = *self.positions.get(handle.0)?;
        self.heap.get(pos).map(|node| (node.expires_at, &node.key))
    }

    /// Checks the heap ordering and the handle table against each other.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        for (pos, node) in self.heap.iter().enumerate() {
            assert_eq!(self.positions[node.handle], pos, "stale position for handle");
            if pos > 0 {
                let parent = &self.heap[(pos - 1) / 2];
                assert!(parent.expires_at <= node.expires_at, "heap order violated");
            }
        }
        let live = self.positions.iter().filter(|&&p| p != VACANT).count();
        assert_eq!(live, self.heap.len());
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.positions[self.heap[a].handle] = a;
        self.positions[self.heap[b].handle] = b;
    }

    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].expires_at >= self.heap[parent].expires_at {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
        pos
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;

            if left < len && self.heap[left].expires_at < self.heap[smallest].expires_at {
                smallest = left;
            }
            if right < len && self.heap[right].expires_at < self.heap[smallest].expires_at {
                smallest = right;
            }
            if smallest == pos {
                return;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }
}
