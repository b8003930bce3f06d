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

//! A capacity-bounded array of plain-old-data values.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use bytemuck::Zeroable;

use crate::memory::RawBlock;
use crate::CoreError;

/// An array with an explicit capacity that only grows when asked to.
///
/// Elements `0..len` are the logical contents. Every slot up to `capacity`
/// holds a valid (zero-initialized) `T`, so indexed access is checked against
/// the capacity rather than the length.
pub struct ResizeableArray<T> {
    block: RawBlock,
    len: usize,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T: Copy + Zeroable> ResizeableArray<T> {
    /// Creates an empty array with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            block: RawBlock::allocate_for::<T>(capacity),
            len: 0,
            capacity,
            _marker: PhantomData,
        }
    }

    /// Appends `value`, failing if the array is full.
    pub fn push(&mut self, value: T) -> Result<(), CoreError> {
        if self.len == self.capacity {
            return Err(CoreError::CapacityExceeded {
                what: "array",
                capacity: self.capacity,
            });
        }
        let len = self.len;
        self.slots_mut()[len] = value;
        self.len = len + 1;
        Ok(())
    }

    /// Returns a copy of the element at `index`.
    pub fn get(&self, index: usize) -> Result<T, CoreError> {
        self.check(index)?;
        Ok(self.slots()[index])
    }

    /// Returns a mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, CoreError> {
        self.check(index)?;
        Ok(&mut self.slots_mut()[index])
    }

    /// Overwrites the element at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), CoreError> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Removes the element at `index < len`, shifting the tail left by one.
    pub fn remove_at(&mut self, index: usize) -> Result<T, CoreError> {
        if index >= self.len {
            return Err(CoreError::IndexOutOfRange {
                index,
                capacity: self.len,
            });
        }
        let size = std::mem::size_of::<T>();
        let removed = self.slots()[index];
        self.block
            .copy_within((index + 1) * size, index * size, (self.len - index - 1) * size);
        let len = self.len - 1;
        self.len = len;
        self.slots_mut()[len] = T::zeroed();
        Ok(removed)
    }

    /// Changes the capacity. Shrinking below `len` truncates the contents.
    pub fn resize(&mut self, new_capacity: usize) {
        let bytes = std::mem::size_of::<T>()
            .checked_mul(new_capacity)
            .unwrap_or_else(|| panic!("array of {new_capacity} elements overflows usize"));
        self.block.resize(bytes);
        self.capacity = new_capacity;
        self.len = self.len.min(new_capacity);
    }

    /// Drops every element and zero-fills the storage. The capacity is kept.
    pub fn clear(&mut self) {
        let bytes = self.block.len();
        self.block.zero(0, bytes);
        self.len = 0;
    }

    /// Number of elements pushed.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no element has been pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of elements before the array must be resized.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The logical contents, `0..len`.
    pub fn as_slice(&self) -> &[T] {
        &self.slots()[..self.len]
    }

    /// The logical contents, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        &mut self.slots_mut()[..len]
    }

    /// Iterates over the logical contents.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Bytes held by the backing block.
    pub fn allocated_bytes(&self) -> usize {
        self.block.len()
    }

    fn check(&self, index: usize) -> Result<(), CoreError> {
        if index < self.capacity {
            Ok(())
        } else {
            Err(CoreError::IndexOutOfRange {
                index,
                capacity: self.capacity,
            })
        }
    }

    fn slots(&self) -> &[T] {
        // SAFETY: the block is sized and aligned for `capacity` values of `T`;
        // every byte was zero-filled at allocation and `T: Zeroable`, and all later
        // writes go through typed `T` slots.
        unsafe { std::slice::from_raw_parts(self.block.as_ptr().cast::<T>(), self.capacity) }
    }

    fn slots_mut(&mut self) -> &mut [T] {
        // SAFETY: see `slots`; `&mut self` guarantees exclusive access.
        unsafe {
            std::slice::from_raw_parts_mut(self.block.as_mut_ptr().cast::<T>(), self.capacity)
        }
    }
}

impl<T: Copy + Zeroable> Index<usize> for ResizeableArray<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    fn index(&self, index: usize) -> &T {
        &self.slots()[index]
    }
}

impl<T: Copy + Zeroable> IndexMut<usize> for ResizeableArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.slots_mut()[index]
    }
}

impl<T: Copy + Zeroable + std::fmt::Debug> std::fmt::Debug for ResizeableArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeableArray")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("items", &self.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut array = ResizeableArray::<u32>::with_capacity(2);
        array.push(1).unwrap();
        array.push(2).unwrap();
        assert_eq!(
            array.push(3),
            Err(CoreError::CapacityExceeded {
                what: "array",
                capacity: 2
            })
        );
        assert_eq!(array.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_indexed_access_is_bounded_by_capacity() {
        let mut array = ResizeableArray::<u32>::with_capacity(4);
        assert_eq!(array.get(3), Ok(0), "Unused slots read as zero");
        array.set(3, 7).unwrap();
        assert_eq!(array[3], 7);
        assert!(matches!(
            array.get(4),
            Err(CoreError::IndexOutOfRange {
                index: 4,
                capacity: 4
            })
        ));
    }

    #[test]
    fn test_remove_at_shifts_tail() {
        let mut array = ResizeableArray::<u16>::with_capacity(5);
        for v in [10, 20, 30, 40] {
            array.push(v).unwrap();
        }
        assert_eq!(array.remove_at(1), Ok(20));
        assert_eq!(array.as_slice(), &[10, 30, 40]);
        assert_eq!(array.remove_at(2), Ok(40));
        assert_eq!(array.as_slice(), &[10, 30]);
        assert!(array.remove_at(2).is_err());
        assert_eq!((array[2], array[3]), (0, 0), "Vacated tail is zeroed");

        array.push(50).unwrap();
        assert_eq!(array.as_slice(), &[10, 30, 50]);
    }

    #[test]
    fn test_resize_keeps_contents() {
        let mut array = ResizeableArray::<u64>::with_capacity(2);
        array.push(5).unwrap();
        array.push(6).unwrap();
        array.resize(4);
        array.push(7).unwrap();
        assert_eq!(array.as_slice(), &[5, 6, 7]);
        assert_eq!(array.get(3), Ok(0));

        array.resize(1);
        assert_eq!(array.as_slice(), &[5]);

        array.clear();
        assert!(array.is_empty());
        assert_eq!(array.get(0), Ok(0));
    }
}
