// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A linear-probe map for small key sets.

use bytemuck::Zeroable;

use super::ResizeableArray;
use crate::CoreError;

#[derive(Clone, Copy)]
struct Entry<K, V> {
    key: K,
    value: V,
}

// SAFETY: an all-zero `Entry` is a zeroed key next to a zeroed value.
unsafe impl<K: Zeroable, V: Zeroable> Zeroable for Entry<K, V> {}

/// A map that stores its entries contiguously and finds them by linear scan.
///
/// Lookups are O(n); removal keeps the remaining entries in insertion order.
pub struct LinearMap<K, V> {
    entries: ResizeableArray<Entry<K, V>>,
}

impl<K, V> LinearMap<K, V>
where
    K: Copy + PartialEq + Zeroable,
    V: Copy + Zeroable,
{
    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: ResizeableArray::with_capacity(capacity),
        }
    }

    /// Position of `key` in insertion order.
    pub fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == *key)
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.position(key).map(|i| self.entries[i].value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.position(key)?;
        Some(&mut self.entries.as_mut_slice()[index].value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Inserts or overwrites the value under `key`, returning the previous value.
    ///
    /// Fails with [`CoreError::CapacityExceeded`] when a new key does not fit.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, CoreError> {
        if let Some(slot) = self.get_mut(&key) {
            return Ok(Some(std::mem::replace(slot, value)));
        }
        self.entries
            .push(Entry { key, value })
            .map_err(|_| CoreError::CapacityExceeded {
                what: "linear map",
                capacity: self.entries.capacity(),
            })?;
        Ok(None)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.position(key)?;
        self.entries.remove_at(index).ok().map(|entry| entry.value)
    }

    /// Changes the capacity. Shrinking below `len` drops the newest entries.
    pub fn resize(&mut self, new_capacity: usize) {
        self.entries.resize(new_capacity);
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries before the map must be resized.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.entries.iter().map(|entry| (entry.key, entry.value))
    }
}
