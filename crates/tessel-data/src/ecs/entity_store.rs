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

//! Internal entity storage and ID management.

use tessel_core::ecs::EntityId;
use tessel_core::CoreError;

use super::{EntityMetadata, Table};
use crate::NotFound;

#[derive(Debug, Clone, Copy, bytemuck::Zeroable)]
pub(crate) struct EntitySlot {
    pub(crate) handle: EntityId,
}

/// Internal manager for entity slots and metadata.
///
/// Slots live in a fixed-capacity [`Table`]; the metadata block of slot `i`
/// is `metadata[i]`, present exactly while the slot is live. Every slot keeps
/// a generation counter that is bumped when its entity is destroyed.
pub(crate) struct EntityStore {
    pub(crate) slots: Table<EntitySlot>,
    pub(crate) metadata: Vec<Option<EntityMetadata>>,
    generations: Vec<u32>,
    next_id: u64,
}

impl EntityStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Table::with_capacity("entity", capacity),
            metadata: vec![None; capacity],
            generations: vec![0; capacity],
            next_id: 1,
        }
    }

    /// Allocates a slot and a fresh, never reused `EntityId`.
    pub fn create(&mut self) -> Result<EntityId, CoreError> {
        let id = self.next_id;
        let generations = &self.generations;
        let index = self.slots.insert_with(|index| EntitySlot {
            handle: EntityId {
                id,
                index: index as u32,
                generation: generations[index],
            },
        })?;
        self.next_id += 1;
        self.metadata[index] = Some(EntityMetadata::new());
        Ok(self.slots.get(index)?.handle)
    }

    /// Returns the slot index of a live entity.
    pub fn resolve(&self, handle: EntityId) -> Result<usize, NotFound> {
        let index = handle.index as usize;
        match self.slots.live_row(index) {
            Some(slot) if slot.handle.id == handle.id && slot.handle.generation == handle.generation => {
                Ok(index)
            }
            _ => Err(NotFound::Entity(handle)),
        }
    }

    pub fn is_alive(&self, handle: EntityId) -> bool {
        self.resolve(handle).is_ok()
    }

    pub fn metadata(&self, handle: EntityId) -> Result<&EntityMetadata, NotFound> {
        let index = self.resolve(handle)?;
        self.metadata[index].as_ref().ok_or(NotFound::Entity(handle))
    }

    pub fn metadata_mut(&mut self, handle: EntityId) -> Result<&mut EntityMetadata, NotFound> {
        let index = self.resolve(handle)?;
        self.metadata[index].as_mut().ok_or(NotFound::Entity(handle))
    }

    /// Handle of the entity occupying slot `index`.
    pub fn handle_at(&self, index: usize) -> Option<EntityId> {
        self.slots.live_row(index).map(|slot| slot.handle)
    }

    /// Detaches the metadata block of a live entity, leaving its slot occupied
    /// until [`vacate`](Self::vacate) is called.
    pub fn take_metadata(&mut self, handle: EntityId) -> Result<EntityMetadata, NotFound> {
        let index = self.resolve(handle)?;
        self.metadata[index].take().ok_or(NotFound::Entity(handle))
    }

    /// Zero-fills slot `index` and bumps its generation.
    pub fn vacate(&mut self, index: usize) -> Result<(), CoreError> {
        if self.slots.vacate(index)?.is_some() {
            self.metadata[index] = None;
            self.generations[index] = self.generations[index].wrapping_add(1);
        }
        Ok(())
    }

    /// Iterates over live entities and their metadata, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityMetadata)> + '_ {
        self.slots.iter().filter_map(|(index, slot)| {
            self.metadata[index]
                .as_ref()
                .map(|metadata| (slot.handle, metadata))
        })
    }

    pub fn len(&self) -> usize {
        self.slots.entry_count()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_recycling_bumps_generation() {
        let mut store = EntityStore::with_capacity(2);
        let a = store.create().unwrap();
        let b = store.create().unwrap();
        assert_eq!((a.index, a.generation), (0, 0));
        assert_eq!((b.index, b.generation), (1, 0));
        assert_ne!(a.id, b.id);

        store.take_metadata(a).unwrap();
        store.vacate(a.index as usize).unwrap();
        assert!(!store.is_alive(a));

        let c = store.create().unwrap();
        assert_eq!((c.index, c.generation), (0, 1), "Slot 0 is reused one generation later");
        assert!(store.metadata(a).is_err(), "The stale handle must not resolve");
        assert!(store.metadata(c).is_ok());
        assert_eq!(store.iter().map(|(e, _)| e.id).collect::<Vec<_>>(), vec![c.id, b.id]);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut store = EntityStore::with_capacity(1);
        store.create().unwrap();
        assert!(matches!(
            store.create(),
            Err(CoreError::CapacityExceeded {
                what: "entity",
                capacity: 1
            })
        ));
    }
}
