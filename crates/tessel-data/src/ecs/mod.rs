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

//! Implements the entity-component model.
//!
//! Entities are rows in a fixed-capacity entity table. Each live entity owns a
//! small metadata block listing references into per-type component tables,
//! and each component row points back at its owner. The registry lists every
//! table the [`World`] knows about.
//!
//! The primary entry point for interacting with the ECS is the [`World`] struct.

mod bitset;
mod component;
mod components;
mod entity;
mod entity_store;
mod page;
mod query;
mod registry;
mod storage;
mod table;
mod world;

pub use bitset::SlotBitset;
pub use component::{Component, ComponentTypeId};
pub use components::*;
pub use entity::*;
pub use page::ComponentTable;
pub use registry::*;
pub use table::Table;
pub use world::*;

pub use tessel_core::ecs::EntityId;
pub use tessel_macros::Component;
