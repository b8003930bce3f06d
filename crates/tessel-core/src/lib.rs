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

//! # Tessel Core
//!
//! The foundational crate of the tessel workspace. It owns everything that does
//! not depend on the entity-component model itself:
//!
//! - [`memory`]: raw zero-filled heap blocks and process-wide block statistics.
//! - [`math`]: the 2D vector and axis-aligned box primitives.
//! - [`collections`]: a fixed-capacity array and a linear-probe map built on raw blocks.
//! - [`ecs`]: the generation-counted entity handle shared by every other crate.
//! - [`physics`]: the dynamic AABB tree used for broad-phase collision queries.

#![warn(missing_docs)]

pub mod collections;
pub mod ecs;
pub mod error;
pub mod math;
pub mod memory;
pub mod physics;

pub use error::CoreError;
