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

//! Raw heap blocks and process-wide block statistics.
//!
//! Every table, array and payload in the workspace is backed by a [`RawBlock`].
//! Blocks update a small set of global atomic counters on allocation, resize
//! and release, and [`block_stats`] reads them back as a snapshot.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

mod block;

pub use block::RawBlock;

// --- Global Block Counters ---

/// Number of blocks currently holding memory.
pub static LIVE_BLOCKS: AtomicUsize = AtomicUsize::new(0);

/// Number of bytes currently held by all blocks.
pub static LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);

/// The maximum value [`LIVE_BYTES`] has ever reached.
pub static PEAK_BYTES: AtomicUsize = AtomicUsize::new(0);

/// Total number of block allocations.
pub static TOTAL_ALLOCATIONS: AtomicU64 = AtomicU64::new(0);

/// Total number of block resizes.
pub static TOTAL_RESIZES: AtomicU64 = AtomicU64::new(0);

/// Total number of block releases.
pub static TOTAL_RELEASES: AtomicU64 = AtomicU64::new(0);

/// A snapshot of the global block counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStats {
    /// Blocks currently holding memory.
    pub live_blocks: usize,
    /// Bytes currently held.
    pub live_bytes: usize,
    /// Highest simultaneous byte count observed.
    pub peak_bytes: usize,
    /// Allocations since process start.
    pub total_allocations: u64,
    /// Resizes since process start.
    pub total_resizes: u64,
    /// Releases since process start.
    pub total_releases: u64,
}

/// Reads the global block counters.
///
/// The counters are updated with relaxed ordering, so the snapshot is only
/// exact when no other thread is allocating.
pub fn block_stats() -> BlockStats {
    BlockStats {
        live_blocks: LIVE_BLOCKS.load(Ordering::Relaxed),
        live_bytes: LIVE_BYTES.load(Ordering::Relaxed),
        peak_bytes: PEAK_BYTES.load(Ordering::Relaxed),
        total_allocations: TOTAL_ALLOCATIONS.load(Ordering::Relaxed),
        total_resizes: TOTAL_RESIZES.load(Ordering::Relaxed),
        total_releases: TOTAL_RELEASES.load(Ordering::Relaxed),
    }
}

fn record_acquire(bytes: usize) {
    LIVE_BLOCKS.fetch_add(1, Ordering::Relaxed);
    TOTAL_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    grow_live_bytes(bytes);
}

fn record_release(bytes: usize) {
    LIVE_BLOCKS.fetch_sub(1, Ordering::Relaxed);
    TOTAL_RELEASES.fetch_add(1, Ordering::Relaxed);
    LIVE_BYTES.fetch_sub(bytes, Ordering::Relaxed);
}

fn record_resize(old_bytes: usize, new_bytes: usize) {
    TOTAL_RESIZES.fetch_add(1, Ordering::Relaxed);
    if new_bytes >= old_bytes {
        grow_live_bytes(new_bytes - old_bytes);
    } else {
        LIVE_BYTES.fetch_sub(old_bytes - new_bytes, Ordering::Relaxed);
    }
}

fn grow_live_bytes(bytes: usize) {
    let live = LIVE_BYTES.fetch_add(bytes, Ordering::Relaxed) + bytes;
    PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
}
