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

//! A uniquely owned, zero-filled region of heap memory.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

/// A contiguous heap region of `len` bytes aligned to `align`.
///
/// Fresh bytes are always zero: on allocation, and for the tail gained by a
/// growing [`resize`](RawBlock::resize). The memory is released when the block
/// is dropped. Allocation failure aborts through [`alloc::handle_alloc_error`].
///
/// Zero-sized blocks own no memory and point at a dangling, well-aligned address.
pub struct RawBlock {
    ptr: NonNull<u8>,
    len: usize,
    align: usize,
}

// SAFETY: a `RawBlock` is the sole owner of its memory; it carries no
// thread-affine state.
unsafe impl Send for RawBlock {}
// SAFETY: shared access only hands out `*const u8` and immutable reads.
unsafe impl Sync for RawBlock {}

impl RawBlock {
    /// Allocates a zero-filled block of `len` bytes aligned to `align`.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two or the rounded size overflows `isize`.
    pub fn allocate(len: usize, align: usize) -> Self {
        let layout = Self::layout(len, align);
        if len == 0 {
            return Self::dangling(align);
        }
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };
        super::record_acquire(len);
        Self { ptr, len, align }
    }

    /// Allocates a zero-filled block sized for `count` values of `T`.
    pub fn allocate_for<T>(count: usize) -> Self {
        let len = std::mem::size_of::<T>()
            .checked_mul(count)
            .unwrap_or_else(|| panic!("block for {count} elements overflows usize"));
        Self::allocate(len, std::mem::align_of::<T>())
    }

    /// Changes the size of the block, preserving the first `min(old, new)` bytes.
    ///
    /// The block may move; any pointer previously obtained from it is invalidated.
    /// Bytes gained by growing are zero.
    pub fn resize(&mut self, new_len: usize) {
        if new_len == self.len {
            return;
        }
        if self.len == 0 {
            *self = Self::allocate(new_len, self.align);
            return;
        }
        if new_len == 0 {
            *self = Self::dangling(self.align);
            return;
        }

        let old_layout = Self::layout(self.len, self.align);
        let new_layout = Self::layout(new_len, self.align);
        // SAFETY: `ptr` was allocated with `old_layout` and `new_len` is non-zero
        // and fits `isize` once rounded (checked by `layout`).
        let raw = unsafe { alloc::realloc(self.ptr.as_ptr(), old_layout, new_len) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(new_layout);
        };
        if new_len > self.len {
            // SAFETY: the range `[len, new_len)` is inside the new allocation.
            unsafe { ptr::write_bytes(ptr.as_ptr().add(self.len), 0, new_len - self.len) };
        }
        super::record_resize(self.len, new_len);
        self.ptr = ptr;
        self.len = new_len;
    }

    /// Zero-fills `len` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie inside the block.
    pub fn zero(&mut self, offset: usize, len: usize) {
        self.check_range(offset, len);
        // SAFETY: the range was bounds-checked above.
        unsafe { ptr::write_bytes(self.ptr.as_ptr().add(offset), 0, len) };
    }

    /// Copies `bytes` into the block starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the destination range does not lie inside the block.
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.check_range(offset, bytes.len());
        // SAFETY: the destination was bounds-checked and `bytes` cannot alias a
        // block we hold mutably.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.ptr.as_ptr().add(offset), bytes.len())
        };
    }

    /// Copies `len` bytes from `src[src_offset..]` into `self[dst_offset..]`.
    ///
    /// # Panics
    ///
    /// Panics if either range is out of bounds.
    pub fn copy_from(&mut self, dst_offset: usize, src: &RawBlock, src_offset: usize, len: usize) {
        self.check_range(dst_offset, len);
        src.check_range(src_offset, len);
        // SAFETY: both ranges were bounds-checked; `&mut self` and `&src` are distinct blocks.
        unsafe {
            ptr::copy_nonoverlapping(
                src.ptr.as_ptr().add(src_offset),
                self.ptr.as_ptr().add(dst_offset),
                len,
            )
        };
    }

    /// Moves `len` bytes inside the block from `src` to `dst`. The ranges may overlap.
    ///
    /// # Panics
    ///
    /// Panics if either range is out of bounds.
    pub fn copy_within(&mut self, src: usize, dst: usize, len: usize) {
        self.check_range(src, len);
        self.check_range(dst, len);
        // SAFETY: both ranges were bounds-checked; `ptr::copy` handles overlap.
        unsafe { ptr::copy(self.ptr.as_ptr().add(src), self.ptr.as_ptr().add(dst), len) };
    }

    /// Returns the block contents as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: every byte of the block is initialized (zero-filled at allocation).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns a raw pointer to the first byte.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Returns a raw mutable pointer to the first byte.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Size of the block in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the block owns no memory.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment the block was allocated with.
    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    fn layout(len: usize, align: usize) -> Layout {
        Layout::from_size_align(len, align)
            .unwrap_or_else(|err| panic!("invalid block layout ({len} bytes, align {align}): {err}"))
    }

    fn dangling(align: usize) -> Self {
        // SAFETY: `align` is a non-zero power of two (validated by `layout`).
        let ptr = unsafe { NonNull::new_unchecked(align as *mut u8) };
        Self { ptr, len: 0, align }
    }

    fn check_range(&self, offset: usize, len: usize) {
        let in_bounds = offset.checked_add(len).is_some_and(|end| end <= self.len);
        assert!(
            in_bounds,
            "range {offset}..{offset}+{len} is outside a block of {} bytes",
            self.len
        );
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        let layout = Self::layout(self.len, self.align);
        // SAFETY: `ptr` was allocated (or last reallocated) with exactly `layout`.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        super::record_release(self.len);
    }
}

impl std::fmt::Debug for RawBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBlock")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("align", &self.align)
            .finish()
    }
}
