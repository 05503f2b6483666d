//! Dense storage indexed by a strong id.
//!
//! `IdMap<K, V>` is a `Vec<V>` that can only be indexed by `K`. Positions
//! that were never written hold `V::default()` (the invalid id, for id
//! values), and inserting past the end grows the map.

use crate::id::StrongId;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A `K`-indexed vector of `V`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(serialize = "V: Serialize", deserialize = "V: Deserialize<'de>"))]
pub struct IdMap<K, V> {
    values: Vec<V>,
    #[serde(skip)]
    _key: PhantomData<fn(K) -> K>,
}

impl<K, V> Default for IdMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V: std::fmt::Debug> std::fmt::Debug for IdMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl<K, V> IdMap<K, V> {
    /// Create an empty map.
    pub const fn new() -> Self {
        Self {
            values: Vec::new(),
            _key: PhantomData,
        }
    }

    /// Wrap an existing vector; element `i` becomes the value for index `i`.
    pub fn from_vec(values: Vec<V>) -> Self {
        Self {
            values,
            _key: PhantomData,
        }
    }

    /// Number of slots, including default-filled ones.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the stored values in index order.
    pub fn values(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    /// Iterate mutably over the stored values in index order.
    pub fn values_mut(&mut self) -> std::slice::IterMut<'_, V> {
        self.values.iter_mut()
    }

    /// Consume the map, yielding the underlying vector.
    pub fn into_vec(self) -> Vec<V> {
        self.values
    }

    pub fn as_slice(&self) -> &[V] {
        &self.values
    }

    pub fn shrink_to_fit(&mut self) {
        self.values.shrink_to_fit();
    }
}

impl<K: StrongId, V> IdMap<K, V> {
    /// Create a map with `len` default-filled slots.
    pub fn with_len(len: usize) -> Self
    where
        V: Default,
    {
        let mut values = Vec::with_capacity(len);
        values.resize_with(len, V::default);
        Self::from_vec(values)
    }

    /// Store `value` at `key`, growing the map with defaults if needed.
    ///
    /// Panics if `key` is the invalid sentinel.
    pub fn insert(&mut self, key: K, value: V)
    where
        V: Default,
    {
        let idx = key.index();
        if idx >= self.values.len() {
            self.values.resize_with(idx + 1, V::default);
        }
        self.values[idx] = value;
    }

    /// Append `value` and return the key it was stored under.
    pub fn push(&mut self, value: V) -> K {
        let key = K::from_index(self.values.len());
        self.values.push(value);
        key
    }

    /// Value at `key`, or `None` if `key` is invalid or out of range.
    pub fn get(&self, key: K) -> Option<&V> {
        if key.is_valid() {
            self.values.get(key.index())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        if key.is_valid() {
            self.values.get_mut(key.index())
        } else {
            None
        }
    }

    /// Returns true if `key` addresses an existing slot.
    pub fn contains_key(&self, key: K) -> bool {
        key.is_valid() && key.index() < self.values.len()
    }

    /// All keys `0..len` in order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = K> + ExactSizeIterator + use<K, V> {
        (0..self.values.len()).map(K::from_index)
    }

    /// Iterate over `(key, &value)` pairs in index order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (K, &V)> + ExactSizeIterator {
        self.values
            .iter()
            .enumerate()
            .map(|(idx, value)| (K::from_index(idx), value))
    }

    /// Consume the map, yielding owned `(key, value)` pairs in index order.
    pub fn into_iter_keyed(self) -> impl DoubleEndedIterator<Item = (K, V)> + ExactSizeIterator {
        self.values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| (K::from_index(idx), value))
    }
}

impl<K: StrongId, V> Index<K> for IdMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &V {
        &self.values[key.index()]
    }
}

impl<K: StrongId, V> IndexMut<K> for IdMap<K, V> {
    fn index_mut(&mut self, key: K) -> &mut V {
        &mut self.values[key.index()]
    }
}

impl<K, V> FromIterator<V> for IdMap<K, V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a, K, V> IntoIterator for &'a IdMap<K, V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<K, V> IntoIterator for IdMap<K, V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
