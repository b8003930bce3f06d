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

//! # Tessel Data
//!
//! The data layer of the workspace: the entity store, per-type component
//! tables, the asset-name table and the [`World`](ecs::World) that ties them
//! together with the spatial index.

#![warn(missing_docs)]

// Lets `#[derive(Component)]` expand to `::tessel_data::...` inside this crate too.
extern crate self as tessel_data;

pub mod assets;
pub mod config;
pub mod ecs;
pub mod error;

pub use config::WorldConfig;
pub use error::{EcsError, NotFound};
