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

use smallvec::SmallVec;

use super::ComponentTypeId;

/// Location of one component value: its type, its row in that type's table,
/// and the row's generation when the value was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    /// Type (and therefore table) of the component.
    pub type_id: ComponentTypeId,
    /// Row in the component table.
    pub slot: u32,
    /// Generation of the row at insertion time.
    pub generation: u32,
}

/// Represents the central record for an entity, acting as a "table of contents"
/// that points to each of its component values.
///
/// At most one reference per component type is stored. Most entities carry a
/// handful of components, so the first four references live inline.
#[derive(Debug, Clone, Default)]
pub struct EntityMetadata {
    pub(crate) refs: SmallVec<[ComponentRef; 4]>,
}

impl EntityMetadata {
    /// Creates an empty metadata block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reference for `type_id`, if the entity has that component.
    pub fn get(&self, type_id: ComponentTypeId) -> Option<ComponentRef> {
        self.refs.iter().find(|r| r.type_id == type_id).copied()
    }

    /// Returns `true` if the entity has a component of type `type_id`.
    pub fn contains(&self, type_id: ComponentTypeId) -> bool {
        self.get(type_id).is_some()
    }

    /// Returns `true` if the entity has every listed component type.
    pub fn contains_all(&self, type_ids: &[ComponentTypeId]) -> bool {
        type_ids.iter().all(|&t| self.contains(t))
    }

    /// Returns the `index`-th reference, in insertion order.
    pub fn at(&self, index: usize) -> Option<ComponentRef> {
        self.refs.get(index).copied()
    }

    /// Records a new reference. Returns `false` and leaves the block unchanged
    /// if a reference of the same type is already present.
    pub(crate) fn insert(&mut self, component: ComponentRef) -> bool {
        if self.contains(component.type_id) {
            return false;
        }
        self.refs.push(component);
        true
    }

    /// Forgets the reference for `type_id`.
    pub(crate) fn remove(&mut self, type_id: ComponentTypeId) -> Option<ComponentRef> {
        let position = self.refs.iter().position(|r| r.type_id == type_id)?;
        Some(self.refs.remove(position))
    }

    /// Number of components attached.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Returns `true` if the entity has no component.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Iterates over the stored references.
    pub fn iter(&self) -> impl Iterator<Item = ComponentRef> + '_ {
        self.refs.iter().copied()
    }
}
