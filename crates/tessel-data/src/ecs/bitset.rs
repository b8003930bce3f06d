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

//! Implements the liveness bitset used by fixed-capacity tables.

/// A simple bitset wrapped around a `Vec<u64>`.
///
/// Tables use it to mark which of their rows are occupied, so iteration can
/// skip vacated rows without reading them.
#[derive(Debug, Default, Clone)]
pub struct SlotBitset {
    pub(crate) bits: Vec<u64>,
}

impl SlotBitset {
    /// Creates a bitset able to hold `capacity` bits without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: vec![0; capacity.div_ceil(64)],
        }
    }

    /// Sets the bit at the specified index to 1.
    pub fn set(&mut self, index: usize) {
        let word_idx = index / 64;
        if word_idx >= self.bits.len() {
            self.bits.resize(word_idx + 1, 0);
        }
        self.bits[word_idx] |= 1 << (index % 64);
    }

    /// Clears the bit at the specified index to 0.
    pub fn clear(&mut self, index: usize) {
        if let Some(word) = self.bits.get_mut(index / 64) {
            *word &= !(1 << (index % 64));
        }
    }

    /// Returns true if the bit at the specified index is set.
    pub fn is_set(&self, index: usize) -> bool {
        self.bits
            .get(index / 64)
            .is_some_and(|word| word & (1 << (index % 64)) != 0)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Iterates over the indices of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter().enumerate().flat_map(|(word_idx, &word)| {
            let mut remaining = word;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                let bit = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                Some(word_idx * 64 + bit)
            })
        })
    }

    /// Clears every bit.
    pub fn reset(&mut self) {
        self.bits.iter_mut().for_each(|word| *word = 0);
    }
}
