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

//! Owns the component tables of a world and maps Rust types onto them.

use std::any::{type_name, TypeId};

use ahash::AHashMap;

use super::{Component, ComponentTable, ComponentTypeId};
use crate::{EcsError, NotFound};

/// Every component table of a world, indexed by [`ComponentTypeId`].
#[derive(Default)]
pub(crate) struct StorageManager {
    pub(crate) tables: Vec<ComponentTable>,
    lookup: AHashMap<TypeId, ComponentTypeId>,
}

impl StorageManager {
    pub fn contains<T: Component>(&self) -> bool {
        self.lookup.contains_key(&TypeId::of::<T>())
    }

    /// Creates the table for `T`. The id must be the next free table index.
    pub fn register<T: Component>(&mut self, type_id: ComponentTypeId, capacity: usize) {
        debug_assert_eq!(type_id.index(), self.tables.len());
        self.tables.push(ComponentTable::new::<T>(type_id, capacity));
        self.lookup.insert(TypeId::of::<T>(), type_id);
    }

    /// Id of the table storing `T`.
    pub fn type_id_of<T: Component>(&self) -> Result<ComponentTypeId, NotFound> {
        self.lookup
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(NotFound::UnregisteredType(type_name::<T>()))
    }

    pub fn table(&self, type_id: ComponentTypeId) -> &ComponentTable {
        &self.tables[type_id.index()]
    }

    pub fn table_mut(&mut self, type_id: ComponentTypeId) -> &mut ComponentTable {
        &mut self.tables[type_id.index()]
    }

    /// Borrows several distinct tables mutably at once.
    ///
    /// Fails with [`EcsError::AliasedComponents`] if an id is listed twice.
    pub fn tables_mut<const N: usize>(
        &mut self,
        ids: [ComponentTypeId; N],
    ) -> Result<[&mut ComponentTable; N], EcsError> {
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) {
                return Err(EcsError::AliasedComponents(self.tables[id.index()].type_name()));
            }
        }

        let count = self.tables.len();
        let highest = ids.iter().map(|id| id.index()).max().unwrap_or(0);
        self.tables
            .get_disjoint_mut(ids.map(ComponentTypeId::index))
            .map_err(|_| {
                log::error!("Component table {highest} requested but only {count} exist");
                EcsError::IndexOutOfRange {
                    index: highest,
                    capacity: count,
                }
            })
    }
}
