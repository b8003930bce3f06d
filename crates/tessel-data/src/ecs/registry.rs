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

use tessel_core::CoreError;

use super::{ComponentTypeId, Table};

/// Registry slot of the entity table.
pub const ENTITY_TABLE_SLOT: usize = 0;
/// Registry slot of the asset table.
pub const ASSET_TABLE_SLOT: usize = 1;
/// Registry slot of the spatial index.
pub const SPATIAL_INDEX_SLOT: usize = 2;
/// First registry slot available to component tables.
pub const FIRST_COMPONENT_SLOT: usize = 3;

/// What a registry slot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEntry {
    /// The entity table.
    Entities,
    /// The asset-name table.
    Assets,
    /// The dynamic AABB tree.
    SpatialIndex,
    /// The table of a registered component type.
    Components(ComponentTypeId),
}

#[derive(Debug, Clone, Copy, bytemuck::Zeroable)]
struct RegistryRow {
    kind: u8,
    type_id: u16,
}

const KIND_ENTITIES: u8 = 1;
const KIND_ASSETS: u8 = 2;
const KIND_SPATIAL_INDEX: u8 = 3;
const KIND_COMPONENTS: u8 = 4;

/// The lookup table listing every table owned by a [`World`](super::World).
///
/// Slots 0 to 2 are reserved for the entity table, the asset table and the
/// spatial index; component tables follow in registration order, so the
/// table of component id `n` sits at slot `FIRST_COMPONENT_SLOT + n`.
pub struct ComponentRegistry {
    rows: Table<RegistryRow>,
}

impl ComponentRegistry {
    /// Creates a registry with room for `component_capacity` component types.
    pub fn with_capacity(component_capacity: usize) -> Self {
        let mut rows = Table::with_capacity("registry", FIRST_COMPONENT_SLOT + component_capacity);
        for kind in [KIND_ENTITIES, KIND_ASSETS, KIND_SPATIAL_INDEX] {
            // Capacity is at least FIRST_COMPONENT_SLOT.
            let reserved = rows.set_next(RegistryRow { kind, type_id: 0 });
            debug_assert!(reserved.is_ok(), "reserved registry row must fit");
        }
        Self { rows }
    }

    /// Claims the next slot for a component table and returns the id it receives.
    pub(crate) fn claim_component_slot(&mut self) -> Result<ComponentTypeId, CoreError> {
        let next = self.rows.high_water() - FIRST_COMPONENT_SLOT;
        let type_id = u16::try_from(next).map_err(|_| CoreError::CapacityExceeded {
            what: "registry",
            capacity: self.component_capacity(),
        })?;
        let slot = self
            .rows
            .set_next(RegistryRow {
                kind: KIND_COMPONENTS,
                type_id,
            })
            .map_err(|_| CoreError::CapacityExceeded {
                what: "registry",
                capacity: self.component_capacity(),
            })?;
        debug_assert_eq!(slot, FIRST_COMPONENT_SLOT + next);
        Ok(ComponentTypeId(type_id))
    }

    /// Returns what slot `index` refers to, or `None` for an unused slot.
    pub fn entry(&self, index: usize) -> Option<RegistryEntry> {
        let row = self.rows.live_row(index)?;
        match row.kind {
            KIND_ENTITIES => Some(RegistryEntry::Entities),
            KIND_ASSETS => Some(RegistryEntry::Assets),
            KIND_SPATIAL_INDEX => Some(RegistryEntry::SpatialIndex),
            KIND_COMPONENTS => Some(RegistryEntry::Components(ComponentTypeId(row.type_id))),
            _ => None,
        }
    }

    /// Iterates over every occupied slot.
    pub fn entries(&self) -> impl Iterator<Item = (usize, RegistryEntry)> + '_ {
        (0..self.rows.high_water()).filter_map(|index| self.entry(index).map(|e| (index, e)))
    }

    /// Number of registered component types.
    pub fn component_count(&self) -> usize {
        self.rows.entry_count() - FIRST_COMPONENT_SLOT
    }

    /// Maximum number of component types.
    pub fn component_capacity(&self) -> usize {
        self.rows.capacity() - FIRST_COMPONENT_SLOT
    }
}
