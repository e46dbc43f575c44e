//! Ordered Store Module
//!
//! Key-value storage that also keeps every key in recency order.
//!
//! Entries live in an index arena linked as a doubly linked list between two
//! sentinels, so touching, inserting and popping the oldest entry are all O(1).

use std::borrow::Borrow;
use std::hash::Hash;

use ahash::AHashMap;

// == Sentinels ==
/// Least-recently-used end of the list.
const HEAD: usize = 0;
/// Most-recently-used end of the list.
const TAIL: usize = 1;
const NULL: usize = usize::MAX;

struct Node<K, V> {
    /// `None` for the sentinels and for freed slots.
    entry: Option<(K, V)>,
    /// Index toward HEAD (less recently used).
    prev: usize,
    /// Index toward TAIL (more recently used).
    next: usize,
}

impl<K, V> Node<K, V> {
    fn sentinel(prev: usize, next: usize) -> Self {
        Self {
            entry: None,
            prev,
            next,
        }
    }
}

// == Ordered Store ==
/// A hash map whose keys are totally ordered from least to most recently used.
///
/// `get` and `put` move the touched key to the most-recently-used end. The
/// store never evicts on its own; size policy belongs to the caller.
pub struct OrderedStore<K, V> {
    /// Index 0 = HEAD sentinel, 1 = TAIL sentinel, 2+ = entries.
    nodes: Vec<Node<K, V>>,
    /// Maps a key to its slot in `nodes`.
    index: AHashMap<K, usize>,
    /// Freed slots available for reuse.
    free: Vec<usize>,
}

impl<K, V> OrderedStore<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel(NULL, TAIL), Node::sentinel(HEAD, NULL)],
            index: AHashMap::new(),
            free: Vec::new(),
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    ///
    /// A miss leaves the order untouched.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.unlink(idx);
        self.link_before_tail(idx);
        self.nodes[idx].entry.as_ref().map(|(_, v)| v)
    }

    // == Put ==
    /// Inserts or replaces the value for `key`, returning the previous value.
    ///
    /// The key becomes most recently used whether it was new or not.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            self.unlink(idx);
            self.link_before_tail(idx);
            let slot = self.nodes[idx].entry.as_mut()?;
            return Some(std::mem::replace(&mut slot.1, value));
        }

        let idx = self.alloc(key.clone(), value);
        self.index.insert(key, idx);
        self.link_before_tail(idx);
        None
    }

    // == Remove ==
    /// Removes `key` and its position in the order.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        self.release(idx).map(|(_, v)| v)
    }

    // == Clear ==
    /// Removes every entry and resets the list to its two sentinels.
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.index.clear();
        self.free.clear();
    }

    // == Least Recently Used ==
    /// Peeks at the least recently used entry without touching it.
    pub fn least_recently_used(&self) -> Option<(&K, &V)> {
        let idx = self.nodes[HEAD].next;
        self.nodes[idx].entry.as_ref().map(|(k, v)| (k, v))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_least_recently_used(&mut self) -> Option<(K, V)> {
        let idx = self.nodes[HEAD].next;
        if idx == TAIL {
            return None;
        }
        let entry = self.release(idx)?;
        self.index.remove(&entry.0);
        Some(entry)
    }

    // == Contains ==
    /// Returns true if `key` is stored. Does not change the order.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Length ==
    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Iteration ==
    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.nodes[HEAD].next,
        }
    }

    /// Copies every entry, least recently used first.
    pub fn snapshot_in_order(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    // == List Plumbing ==
    fn link_before_tail(&mut self, idx: usize) {
        let last = self.nodes[TAIL].prev;
        self.nodes[idx].prev = last;
        self.nodes[idx].next = TAIL;
        self.nodes[last].next = idx;
        self.nodes[TAIL].prev = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[idx].prev = NULL;
        self.nodes[idx].next = NULL;
    }

    fn alloc(&mut self, key: K, value: V) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx].entry = Some((key, value));
            idx
        } else {
            self.nodes.push(Node {
                entry: Some((key, value)),
                prev: NULL,
                next: NULL,
            });
            self.nodes.len() - 1
        }
    }

    /// Unlinks the slot and hands it back to the free list.
    fn release(&mut self, idx: usize) -> Option<(K, V)> {
        self.unlink(idx);
        self.free.push(idx);
        self.nodes[idx].entry.take()
    }
}

impl<K, V> Default for OrderedStore<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Borrowing iterator over an [`OrderedStore`], oldest entry first.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL || self.cursor == NULL {
            return None;
        }
        let node = &self.nodes[self.cursor];
        self.cursor = node.next;
        node.entry.as_ref().map(|(k, v)| (k, v))
    }
}
