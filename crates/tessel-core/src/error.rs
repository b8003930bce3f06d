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

//! Error type shared by the low-level containers of this crate.

use thiserror::Error;

/// Errors raised by raw-block collections and the dynamic tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An index lies outside `0..capacity`.
    #[error("index {index} is out of range (capacity {capacity})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The capacity of the container at the time of the access.
        capacity: usize,
    },
    /// A fixed-capacity container has no room left.
    #[error("{what} is full (capacity {capacity})")]
    CapacityExceeded {
        /// Human-readable name of the full container.
        what: &'static str,
        /// Its capacity.
        capacity: usize,
    },
    /// A key is not tracked by the container.
    #[error("key not found")]
    KeyNotFound,
    /// A key is already tracked by the container.
    #[error("key is already present")]
    DuplicateKey,
}
