//! Concurrency-safe, insertion-ordered registry.
//!
//! Every shared map in the scheduler (fleet, tasks, unassigned pool) sits
//! behind this façade. Callers never see the lock: each method is one atomic
//! step, and iteration happens over a snapshot.

use std::collections::HashMap;

use parking_lot::RwLock;

struct RegistryInner<V> {
    order: Vec<String>,
    entries: HashMap<String, V>,
}

/// String-keyed map guarded by a `parking_lot::RwLock`, iterated in insertion order.
pub struct Registry<V> {
    inner: RwLock<RegistryInner<V>>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Registry<V> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                order: Vec::new(),
                entries: HashMap::new(),
            }),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().entries.contains_key(key)
    }

    /// Insert `value` unless `key` is taken; hands the value back on conflict.
    pub fn insert_new(&self, key: &str, value: V) -> Result<(), V> {
        let mut inner = self.inner.write();
        if inner.entries.contains_key(key) {
            return Err(value);
        }
        inner.order.push(key.to_string());
        inner.entries.insert(key.to_string(), value);
        Ok(())
    }

    /// Merge into an existing entry with `merge`, or append `value` as new.
    pub fn upsert_with(&self, key: &str, value: V, merge: impl FnOnce(&mut V, V)) {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.entries.get_mut(key) {
            merge(existing, value);
            return;
        }
        inner.order.push(key.to_string());
        inner.entries.insert(key.to_string(), value);
    }

    /// Mutate one entry in place under the write lock.
    pub fn update<R>(&self, key: &str, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let mut inner = self.inner.write();
        inner.entries.get_mut(key).map(f)
    }

    /// Remove an entry.
    pub fn remove(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.write();
        let value = inner.entries.remove(key)?;
        inner.order.retain(|k| k != key);
        Some(value)
    }

    /// Remove the first entry, in insertion order, that satisfies `pred`.
    /// Every other entry keeps its position.
    pub fn remove_first_where(&self, mut pred: impl FnMut(&V) -> bool) -> Option<V> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let entries = &inner.entries;
        let idx = inner
            .order
            .iter()
            .position(|k| entries.get(k).is_some_and(&mut pred))?;
        let key = inner.order.remove(idx);
        inner.entries.remove(&key)
    }

    /// Drop every entry for which `keep` returns false; returns how many went.
    pub fn retain(&self, mut keep: impl FnMut(&V) -> bool) -> usize {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let before = inner.order.len();
        let entries = &mut inner.entries;
        inner.order.retain(|k| {
            let keep_it = entries.get(k).is_some_and(&mut keep);
            if !keep_it {
                entries.remove(k);
            }
            keep_it
        });
        before - inner.order.len()
    }

    /// True if any entry satisfies `pred`.
    pub fn any(&self, mut pred: impl FnMut(&V) -> bool) -> bool {
        self.inner.read().entries.values().any(&mut pred)
    }
}

impl<V: Clone> Registry<V> {
    /// Clone of the entry under `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.read().entries.get(key).cloned()
    }

    /// Clone of every value, in insertion order.
    pub fn values(&self) -> Vec<V> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|k| inner.entries.get(k).cloned())
            .collect()
    }
}
