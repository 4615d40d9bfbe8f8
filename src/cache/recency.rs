//! Recency List Module
//!
//! Doubly linked access-order list for LRU eviction.
//!
//! Nodes live in a `Vec` arena and link to each other by index, so every
//! operation is O(1) given a [`RecencyHandle`] and no unsafe code is needed.
//! Freed slots are recycled.

/// Null link.
const NIL: usize = usize::MAX;

// == Recency Handle ==
/// Opaque position handle into a [`RecencyList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecencyHandle(usize);

#[derive(Debug)]
struct Node<K> {
    /// None while the slot is on the free list
    key: Option<K>,
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// - Front = least recently used
/// - Back = most recently used
#[derive(Debug)]
pub struct RecencyList<K> {
    nodes: Vec<Node<K>>,
    head: usize,
    tail: usize,
    free: Vec<usize>,
    len: usize,
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RecencyList<K> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: NIL,
            tail: NIL,
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Back ==
    /// Appends `key` as the most recently used entry.
    pub fn push_back(&mut self, key: K) -> RecencyHandle {
        let node = Node {
            key: Some(key),
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        self.link_back(idx);
        self.len += 1;
        RecencyHandle(idx)
    }

    // == Move To Back ==
    /// Marks the entry behind `handle` as just accessed.
    pub fn move_to_back(&mut self, handle: RecencyHandle) {
        let idx = handle.0;
        self.assert_live(idx);
        if self.tail == idx {
            return;
        }
        self.unlink(idx);
        self.link_back(idx);
    }

    // == Remove ==
    /// Unlinks the entry behind `handle` and returns its key.
    ///
    /// # Panics
    /// Panics if the handle was already removed.
    pub fn remove(&mut self, handle: RecencyHandle) -> K {
        let idx = handle.0;
        self.assert_live(idx);
        self.unlink(idx);
        self.len -= 1;
        self.free.push(idx);

        match self.nodes[idx].key.take() {
            Some(key) => key,
            None => unreachable!("live node without a key"),
        }
    }

    // == Front ==
    /// Returns the least recently used key without removing it.
    pub fn front(&self) -> Option<&K> {
        if self.head == NIL {
            return None;
        }
        self.nodes[self.head].key.as_ref()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the key behind a live handle.
    #[cfg(test)]
    pub(crate) fn get(&self, handle: RecencyHandle) -> Option<&K> {
        self.nodes.get(handle.0).and_then(|node| node.key.as_ref())
    }

    /// Keys from least to most recently used.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len);
        let mut idx = self.head;
        while idx != NIL {
            if let Some(key) = self.nodes[idx].key.as_ref() {
                keys.push(key);
            }
            idx = self.nodes[idx].next;
        }
        keys
    }

    fn assert_live(&self, idx: usize) {
        assert!(
            self.nodes.get(idx).is_some_and(|node| node.key.is_some()),
            "recency handle is not live"
        );
    }

    fn link_back(&mut self, idx: usize) {
        self.nodes[idx].prev = self.tail;
        self.nodes[idx].next = NIL;
        if self.tail == NIL {
            self.head = idx;
        } else {
            self.nodes[self.tail].next = idx;
        }
        self.tail = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recency_new() {
        let list: RecencyList<&str> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.front().is_none());
    }

    #[test]
    fn test_push_back_keeps_insertion_order() {
        let mut list = RecencyList::new();

        list.push_back("key1");
        list.push_back("key2");
        list.push_back("key3");

        assert_eq!(list.len(), 3);
        // key1 is oldest (added first)
        assert_eq!(list.front(), Some(&"key1"));
        assert_eq!(list.keys(), vec![&"key1", &"key2", &"key3"]);
    }

    #[test]
    fn test_move_to_back() {
        let mut list = RecencyList::new();

        let a = list.push_back("a");
        list.push_back("b");
        list.push_back("c");

        list.move_to_back(a);

        assert_eq!(list.len(), 3);
        assert_eq!(list.front(), Some(&"b"));
        assert_eq!(list.keys(), vec![&"b", &"c", &"a"]);
    }

    #[test]
    fn test_move_tail_is_noop() {
        let mut list = RecencyList::new();

        list.push_back("a");
        let b = list.push_back("b");
        list.move_to_back(b);

        assert_eq!(list.keys(), vec![&"a", &"b"]);
    }

    #[test]
    fn test_remove_front() {
        let mut list = RecencyList::new();

        let first = list.push_back("key1");
        list.push_back("key2");

        assert_eq!(list.remove(first), "key1");
        assert_eq!(list.len(), 1);
        assert_eq!(list.front(), Some(&"key2"));
    }

    #[test]
    fn test_remove_anywhere() {
        let mut list = RecencyList::new();

        let a = list.push_back("a");
        let b = list.push_back("b");
        let c = list.push_back("c");

        assert_eq!(list.remove(b), "b");
        assert_eq!(list.keys(), vec![&"a", &"c"]);

        assert_eq!(list.remove(c), "c");
        assert_eq!(list.keys(), vec![&"a"]);

        assert_eq!(list.remove(a), "a");
        assert!(list.is_empty());
        assert!(list.front().is_none());
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut list = RecencyList::new();

        let a = list.push_back("a");
        list.push_back("b");
        list.remove(a);
        let c = list.push_back("c");

        assert_eq!(a, c);
        assert_eq!(list.get(c), Some(&"c"));
        assert_eq!(list.keys(), vec![&"b", &"c"]);
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut list = RecencyList::new();

        let a = list.push_back("a");
        let b = list.push_back("b");
        let c = list.push_back("c");

        list.move_to_back(a);
        list.move_to_back(c);
        list.move_to_back(b);

        assert_eq!(list.keys(), vec![&"a", &"c", &"b"]);
    }

    #[test]
    #[should_panic(expected = "not live")]
    fn test_remove_stale_handle_panics() {
        let mut list = RecencyList::new();
        let a = list.push_back("a");
        list.remove(a);
        list.remove(a);
    }
}
