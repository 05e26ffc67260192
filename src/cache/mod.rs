//! Bounded, insertion-ordered, LFU-evicted caches (components C4/C5,
//! `spec.md` §4.4/§4.5), ported field-for-field from
//! `examples/original_source/linkcheck/cache/anchor.py`.

pub(crate) mod anchor;
pub(crate) mod result;

use std::collections::HashMap;

/// The shared eviction skeleton both `AnchorCache` and `ResultCache` build
/// on: an insertion-ordered key list plus a monotonic delete index. A key
/// that already exists keeps its original position — re-inserting it never
/// moves it to the back.
pub(crate) struct BoundedStore<V> {
    map: HashMap<String, V>,
    order: Vec<String>,
    delete_index: usize,
    max_size: usize,
}

impl<V> BoundedStore<V> {
    pub(crate) fn new(max_size: usize) -> Self {
        BoundedStore {
            map: HashMap::new(),
            order: Vec::new(),
            delete_index: 0,
            max_size,
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&V> {
        self.map.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Insert `value` under `key`; evict the oldest still-live key once
    /// `max_size` is exceeded. A key that already exists is overwritten in
    /// place and keeps its original insertion order.
    pub(crate) fn put(&mut self, key: String, value: V) {
        if !self.map.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.map.insert(key, value);

        if self.max_size == 0 {
            return;
        }
        while self.map.len() > self.max_size && self.delete_index < self.order.len() {
            let victim = self.order[self.delete_index].clone();
            self.delete_index += 1;
            self.map.remove(&victim);
        }
    }
}
