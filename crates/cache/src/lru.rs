// cache/src/lru.rs

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Outcome of a cache probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Hit,
    Miss,
    Expired,
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// LRU cache with lazy TTL expiry, checked on access
pub struct LruCache<K, V> {
    map: HashMap<K, Entry<V>>,
    order: VecDeque<K>,
    capacity: usize,
    ttl: Duration,
}

impl<K: Clone + std::hash::Hash + Eq, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn get(&mut self, key: &K) -> (Option<V>, Probe) {
        match self.map.get(key) {
            None => (None, Probe::Miss),
            Some(entry) if entry.inserted_at.elapsed() > self.ttl => {
                self.map.remove(key);
                self.order.retain(|k| k != key);
                (None, Probe::Expired)
            }
            Some(entry) => {
                let value = entry.value.clone();
                // Move to front
                self.order.retain(|k| k != key);
                self.order.push_front(key.clone());
                (Some(value), Probe::Hit)
            }
        }
    }

    /// Insert a value; returns true when an older entry was evicted
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut evicted = false;
        if self.map.len() >= self.capacity && !self.map.contains_key(&key) {
            // Remove least recently used
            if let Some(old_key) = self.order.pop_back() {
                self.map.remove(&old_key);
                evicted = true;
            }
        }

        self.order.retain(|k| k != &key);
        self.order.push_front(key.clone());
        self.map.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
        evicted
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}
