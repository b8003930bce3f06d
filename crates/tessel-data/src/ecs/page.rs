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

//! Defines the per-type component table.

use std::any::{type_name, TypeId};
use std::mem::{align_of, size_of};

use tessel_core::ecs::EntityId;
use tessel_core::memory::RawBlock;

use super::{Component, ComponentRef, ComponentTypeId, Table};
use crate::{EcsError, NotFound};

/// One row of a component table.
///
/// The row is valid while it is live in the table, `initialized` is set and
/// the owner is a real entity. The value itself lives in a separate payload
/// block indexed by the same row number.
#[derive(Debug, Clone, Copy, bytemuck::Zeroable)]
pub(crate) struct ComponentSlot {
    pub(crate) type_id: ComponentTypeId,
    pub(crate) initialized: bool,
    pub(crate) generation: u32,
    pub(crate) size: u32,
    pub(crate) owner: EntityId,
}

/// A fixed-capacity table holding every value of one component type.
///
/// Each row owns a heap payload sized and aligned for the type; rows carry a
/// back-reference to the owning entity and a generation that is bumped when
/// the row is released, so a [`ComponentRef`] to a recycled row stops resolving.
pub struct ComponentTable {
    type_id: ComponentTypeId,
    rust_type: TypeId,
    type_name: &'static str,
    size: usize,
    align: usize,
    pub(crate) slots: Table<ComponentSlot>,
    payloads: Vec<Option<RawBlock>>,
    generations: Vec<u32>,
}

impl ComponentTable {
    pub(crate) fn new<T: Component>(type_id: ComponentTypeId, capacity: usize) -> Self {
        let mut payloads = Vec::with_capacity(capacity);
        payloads.resize_with(capacity, || None);
        Self {
            type_id,
            rust_type: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
            slots: Table::with_capacity(type_name::<T>(), capacity),
            payloads,
            generations: vec![0; capacity],
        }
    }

    /// Stores `value` for `owner` in a free row.
    pub(crate) fn insert<T: Component>(
        &mut self,
        owner: EntityId,
        value: T,
    ) -> Result<ComponentRef, EcsError> {
        self.check_type::<T>()?;

        let (type_id, size, generations) = (self.type_id, self.size as u32, &self.generations);
        let index = self.slots.insert_with(|index| ComponentSlot {
            type_id,
            initialized: true,
            generation: generations[index],
            size,
            owner,
        })?;

        let mut payload = RawBlock::allocate(self.size, self.align);
        // SAFETY: the block is exactly `size_of::<T>()` bytes aligned for `T`.
        unsafe { payload.as_mut_ptr().cast::<T>().write(value) };
        self.payloads[index] = Some(payload);

        Ok(ComponentRef {
            type_id,
            slot: index as u32,
            generation: self.generations[index],
        })
    }

    /// Returns the value behind `component`.
    pub fn get<T: Component>(&self, component: ComponentRef) -> Result<&T, EcsError> {
        self.check_type::<T>()?;
        let index = self.resolve(component)?;
        let payload = self.payloads[index]
            .as_ref()
            .ok_or(NotFound::StaleComponent)?;
        // SAFETY: the type was checked above and the payload was written as a `T`
        // by `insert`.
        Ok(unsafe { &*payload.as_ptr().cast::<T>() })
    }

    /// Returns the value behind `component` mutably.
    pub fn get_mut<T: Component>(&mut self, component: ComponentRef) -> Result<&mut T, EcsError> {
        self.check_type::<T>()?;
        let index = self.resolve(component)?;
        let payload = self.payloads[index]
            .as_mut()
            .ok_or(NotFound::StaleComponent)?;
        // SAFETY: see `get`; `&mut self` makes the borrow exclusive.
        Ok(unsafe { &mut *payload.as_mut_ptr().cast::<T>() })
    }

    /// Frees the payload of `component` and zero-fills its row.
    pub(crate) fn release(&mut self, component: ComponentRef) -> Result<(), EcsError> {
        let index = self.resolve(component)?;
        self.payloads[index] = None;
        self.slots.vacate(index)?;
        self.generations[index] = self.generations[index].wrapping_add(1);
        Ok(())
    }

    /// Entity owning row `index`, if the row is live.
    pub fn owner(&self, index: usize) -> Option<EntityId> {
        self.slots
            .live_row(index)
            .filter(|slot| slot.initialized)
            .map(|slot| slot.owner)
    }

    /// Owners of every live row, in row order.
    pub fn owners(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.initialized)
            .map(|(_, slot)| slot.owner)
    }

    /// Id of the stored component type.
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Name of the stored component type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.slots.entry_count()
    }

    /// Returns `true` if no value is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of stored values.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    fn check_type<T: Component>(&self) -> Result<(), EcsError> {
        if TypeId::of::<T>() == self.rust_type {
            Ok(())
        } else {
            Err(EcsError::TypeMismatch {
                expected: self.type_name,
                found: type_name::<T>(),
            })
        }
    }

    fn resolve(&self, component: ComponentRef) -> Result<usize, NotFound> {
        let index = component.slot as usize;
        let valid = component.type_id == self.type_id
            && self.slots.live_row(index).is_some_and(|slot| {
                slot.initialized
                    && slot.type_id == self.type_id
                    && slot.generation == component.generation
                    && slot.size as usize == self.size
                    && !slot.owner.is_null()
            });
        if valid {
            Ok(index)
        } else {
            Err(NotFound::StaleComponent)
        }
    }
}
