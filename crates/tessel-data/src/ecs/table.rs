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

//! The fixed-capacity table shared by the registry, the entity store, the
//! asset table and every component table.

use bytemuck::Zeroable;
use tessel_core::collections::ResizeableArray;
use tessel_core::CoreError;

use super::SlotBitset;

/// A table of `capacity` rows of plain data.
///
/// Rows are handed out by [`insert_with`](Table::insert_with): vacated rows are
/// reused first (most recently vacated first), then the row at the high-water
/// mark. A vacated row is zero-filled. Iteration only visits rows below the
/// high-water mark whose liveness bit is set, so holes never end a scan early.
pub struct Table<T> {
    name: &'static str,
    rows: ResizeableArray<T>,
    live: SlotBitset,
    vacant: Vec<usize>,
    entry_count: usize,
    high_water: usize,
}

impl<T: Copy + Zeroable> Table<T> {
    /// Creates an empty table. `name` is used in error messages and logs.
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            rows: ResizeableArray::with_capacity(capacity),
            live: SlotBitset::with_capacity(capacity),
            vacant: Vec::new(),
            entry_count: 0,
            high_water: 0,
        }
    }

    /// Index the next insertion will use, or `None` when the table is full.
    pub fn next_index(&self) -> Option<usize> {
        self.vacant.last().copied().or_else(|| {
            (self.high_water < self.rows.capacity()).then_some(self.high_water)
        })
    }

    /// Claims a row and fills it with `make(index)`.
    pub fn insert_with(&mut self, make: impl FnOnce(usize) -> T) -> Result<usize, CoreError> {
        let Some(index) = self.next_index() else {
            return Err(CoreError::CapacityExceeded {
                what: self.name,
                capacity: self.rows.capacity(),
            });
        };
        if self.vacant.last() == Some(&index) {
            self.vacant.pop();
        } else {
            self.high_water += 1;
        }

        self.rows[index] = make(index);
        self.live.set(index);
        self.entry_count += 1;
        Ok(index)
    }

    /// Claims a row and stores `value` in it.
    pub fn set_next(&mut self, value: T) -> Result<usize, CoreError> {
        self.insert_with(|_| value)
    }

    /// Returns the row at `index`, live or not.
    pub fn get(&self, index: usize) -> Result<&T, CoreError> {
        self.check(index)?;
        Ok(&self.rows[index])
    }

    /// Returns the row at `index` mutably, live or not.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, CoreError> {
        self.check(index)?;
        Ok(&mut self.rows[index])
    }

    /// Returns the row at `index` if it is live.
    pub fn live_row(&self, index: usize) -> Option<&T> {
        self.is_live(index).then(|| &self.rows[index])
    }

    /// Returns the row at `index` mutably if it is live.
    pub fn live_row_mut(&mut self, index: usize) -> Option<&mut T> {
        if self.is_live(index) {
            Some(&mut self.rows[index])
        } else {
            None
        }
    }

    /// Returns `true` if the row at `index` is occupied.
    pub fn is_live(&self, index: usize) -> bool {
        self.live.is_set(index)
    }

    /// Zero-fills a live row and makes it available for reuse.
    ///
    /// Returns the row's previous contents, or `None` if it was already vacant.
    pub fn vacate(&mut self, index: usize) -> Result<Option<T>, CoreError> {
        self.check(index)?;
        if !self.is_live(index) {
            return Ok(None);
        }
        let previous = std::mem::replace(&mut self.rows[index], T::zeroed());
        self.live.clear(index);
        self.vacant.push(index);
        self.entry_count -= 1;
        Ok(Some(previous))
    }

    /// Iterates over `(index, row)` for every live row, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.live
            .iter_ones()
            .take_while(|&index| index < self.high_water)
            .map(|index| (index, &self.rows[index]))
    }

    /// Number of live rows.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Maximum number of live rows.
    pub fn capacity(&self) -> usize {
        self.rows.capacity()
    }

    /// One past the highest row index ever used.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Returns `true` if no row can be claimed.
    pub fn is_full(&self) -> bool {
        self.next_index().is_none()
    }

    /// Name given at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bytes held by the row storage.
    pub fn allocated_bytes(&self) -> usize {
        self.rows.allocated_bytes()
    }

    fn check(&self, index: usize) -> Result<(), CoreError> {
        if index < self.rows.capacity() {
            Ok(())
        } else {
            Err(CoreError::IndexOutOfRange {
                index,
                capacity: self.rows.capacity(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_and_overflow() {
        let mut table = Table::<u32>::with_capacity("numbers", 2);
        assert_eq!(table.set_next(10), Ok(0));
        assert_eq!(table.set_next(11), Ok(1));
        assert!(table.is_full());
        assert_eq!(
            table.set_next(12),
            Err(CoreError::CapacityExceeded {
                what: "numbers",
                capacity: 2
            })
        );
        assert_eq!(table.entry_count(), 2);
    }

    #[test]
    fn test_vacated_rows_are_zeroed_and_reused() {
        let mut table = Table::<u32>::with_capacity("numbers", 4);
        for v in [1, 2, 3] {
            table.set_next(v).unwrap();
        }
        assert_eq!(table.vacate(1), Ok(Some(2)));
        assert_eq!(table.vacate(1), Ok(None), "Vacating twice is a no-op");
        assert_eq!(table.get(1), Ok(&0));
        assert_eq!(table.entry_count(), 2);

        assert_eq!(table.next_index(), Some(1));
        assert_eq!(table.set_next(9), Ok(1));
        assert_eq!(table.set_next(4), Ok(3));
        assert_eq!(table.high_water(), 4);
    }

    #[test]
    fn test_iteration_skips_holes() {
        let mut table = Table::<u32>::with_capacity("numbers", 8);
        for v in 0..5 {
            table.set_next(v).unwrap();
        }
        table.vacate(0).unwrap();
        table.vacate(2).unwrap();

        let rows: Vec<_> = table.iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(rows, vec![(1, 1), (3, 3), (4, 4)]);
        assert!(table.live_row(2).is_none());
        assert_eq!(table.live_row(4), Some(&4));
    }

    #[test]
    fn test_out_of_range_access() {
        let mut table = Table::<u8>::with_capacity("bytes", 1);
        assert!(matches!(
            table.get(1),
            Err(CoreError::IndexOutOfRange {
                index: 1,
                capacity: 1
            })
        ));
        assert!(table.vacate(5).is_err());
    }
}
