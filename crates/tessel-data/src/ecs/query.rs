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

//! Iteration over the entities that carry a given set of component types.
//!
//! Every scan walks the entity table in slot order up to its high-water mark,
//! skipping vacant slots, and hands the visitor mutable access to the
//! requested components of each matching entity.

use std::any::type_name;

use tessel_core::ecs::EntityId;

use super::{Component, World};
use crate::EcsError;

impl World {
    /// Calls `f` on the `A` of every entity that has one.
    pub fn for_each<A: Component>(&mut self, mut f: impl FnMut(&mut A)) -> Result<(), EcsError> {
        self.for_each_with_entity::<A>(|_, a| f(a))
    }

    /// Like [`for_each`](Self::for_each), also passing the entity.
    pub fn for_each_with_entity<A: Component>(
        &mut self,
        mut f: impl FnMut(EntityId, &mut A),
    ) -> Result<(), EcsError> {
        self.assert_owner_thread();
        let a = self.storage.type_id_of::<A>()?;
        let table = self.storage.table_mut(a);
        for (entity, metadata) in self.entities.iter() {
            if let Some(ra) = metadata.get(a) {
                f(entity, table.get_mut::<A>(ra)?);
            }
        }
        Ok(())
    }

    /// Calls `f` on the `A` and `B` of every entity that has both.
    ///
    /// Fails with [`EcsError::AliasedComponents`] if `A` and `B` are the same type.
    pub fn for_each2<A, B>(&mut self, mut f: impl FnMut(&mut A, &mut B)) -> Result<(), EcsError>
    where
        A: Component,
        B: Component,
    {
        self.for_each2_with_entity::<A, B>(|_, a, b| f(a, b))
    }

    /// Like [`for_each2`](Self::for_each2), also passing the entity.
    pub fn for_each2_with_entity<A, B>(
        &mut self,
        mut f: impl FnMut(EntityId, &mut A, &mut B),
    ) -> Result<(), EcsError>
    where
        A: Component,
        B: Component,
    {
        self.assert_owner_thread();
        let (a, b) = (self.storage.type_id_of::<A>()?, self.storage.type_id_of::<B>()?);
        let [ta, tb] = self.storage.tables_mut([a, b])?;
        for (entity, metadata) in self.entities.iter() {
            if let (Some(ra), Some(rb)) = (metadata.get(a), metadata.get(b)) {
                f(entity, ta.get_mut::<A>(ra)?, tb.get_mut::<B>(rb)?);
            }
        }
        Ok(())
    }

    /// Calls `f` on the `A`, `B` and `C` of every entity that has all three.
    pub fn for_each3<A, B, C>(
        &mut self,
        mut f: impl FnMut(&mut A, &mut B, &mut C),
    ) -> Result<(), EcsError>
    where
        A: Component,
        B: Component,
        C: Component,
    {
        self.assert_owner_thread();
        let a = self.storage.type_id_of::<A>()?;
        let b = self.storage.type_id_of::<B>()?;
        let c = self.storage.type_id_of::<C>()?;
        let [ta, tb, tc] = self.storage.tables_mut([a, b, c])?;
        for (_, metadata) in self.entities.iter() {
            if let (Some(ra), Some(rb), Some(rc)) = (metadata.get(a), metadata.get(b), metadata.get(c)) {
                f(
                    ta.get_mut::<A>(ra)?,
                    tb.get_mut::<B>(rb)?,
                    tc.get_mut::<C>(rc)?,
                );
            }
        }
        Ok(())
    }

    /// First entity, in slot order, whose `T` satisfies `predicate`.
    pub fn find_entity<T: Component>(
        &self,
        mut predicate: impl FnMut(&T) -> bool,
    ) -> Result<Option<EntityId>, EcsError> {
        let type_id = self.storage.type_id_of::<T>()?;
        let table = self.storage.table(type_id);
        for (entity, metadata) in self.entities.iter() {
            if let Some(component) = metadata.get(type_id) {
                if predicate(table.get::<T>(component)?) {
                    return Ok(Some(entity));
                }
            }
        }
        log::trace!("No entity matched the `{}` predicate", type_name::<T>());
        Ok(None)
    }

    /// Entities carrying a `T`, in slot order.
    pub fn entities_with<T: Component>(&self) -> Result<Vec<EntityId>, EcsError> {
        let type_id = self.storage.type_id_of::<T>()?;
        Ok(self
            .entities
            .iter()
            .filter(|(_, metadata)| metadata.contains(type_id))
            .map(|(entity, _)| entity)
            .collect())
    }
}
