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

use std::any::{type_name, TypeId};
use std::thread::{self, ThreadId};

use tessel_core::ecs::EntityId;
use tessel_core::physics::DynamicTree;

use super::entity_store::EntityStore;
use super::storage::StorageManager;
use super::{
    Collider, Component, ComponentRef, ComponentRegistry, ComponentTable, ComponentTypeId,
    PhysicsBody, Transform,
};
use crate::assets::AssetTable;
use crate::{EcsError, NotFound, WorldConfig};

/// Component types every world registers on construction, with
/// `default_component_capacity` rows each. They do not count against
/// `registry_capacity`.
pub const BUILTIN_COMPONENTS: usize = 3;

/// The central container for the entire ECS, holding all entities, components, and metadata.
///
/// A `World` is an explicit context: it owns the registry, the entity table,
/// every component table, the asset-name table and the spatial index. Several
/// worlds can coexist and dropping one releases everything it holds.
///
/// A world may be moved to another thread, but it records the thread that
/// owns it and mutating entry points panic when called from any other one.
/// After a deliberate move, call [`rebind_owner_thread`](Self::rebind_owner_thread).
pub struct World {
    config: WorldConfig,
    pub(crate) registry: ComponentRegistry,
    pub(crate) entities: EntityStore,
    pub(crate) storage: StorageManager,
    assets: AssetTable,
    tree: DynamicTree<EntityId>,
    owner: ThreadId,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    /// Creates a world sized by `config` with `Transform`, `Collider` and
    /// `PhysicsBody` already registered.
    pub fn new(config: WorldConfig) -> Self {
        let mut world = Self {
            registry: ComponentRegistry::with_capacity(config.registry_capacity + BUILTIN_COMPONENTS),
            entities: EntityStore::with_capacity(config.entity_capacity),
            storage: StorageManager::default(),
            assets: AssetTable::with_capacity(config.asset_capacity),
            tree: DynamicTree::with_capacity(config.tree_initial_nodes(), config.tree_growth()),
            owner: thread::current().id(),
            config,
        };

        let capacity = world.config.default_component_capacity;
        for result in [
            world.register_component_type::<Transform>(capacity),
            world.register_component_type::<Collider>(capacity),
            world.register_component_type::<PhysicsBody>(capacity),
        ] {
            if let Err(err) = result {
                log::error!("Failed to register a built-in component: {err}");
            }
        }

        log::debug!(
            "World created: {} entities, {} component types, {} assets",
            world.config.entity_capacity,
            world.config.registry_capacity,
            world.config.asset_capacity
        );
        world
    }

    // --- Component types ---

    /// Creates the table for component type `T` with room for `capacity` values.
    ///
    /// Must be called once per type before the type is used.
    pub fn register_component_type<T: Component>(
        &mut self,
        capacity: usize,
    ) -> Result<ComponentTypeId, EcsError> {
        self.assert_owner_thread();
        if self.storage.contains::<T>() {
            return Err(EcsError::AlreadyRegistered(type_name::<T>()));
        }
        let type_id = self.registry.claim_component_slot().map_err(|err| {
            log::error!("Cannot register component `{}`: {err}", type_name::<T>());
            EcsError::from(err)
        })?;
        self.storage.register::<T>(type_id, capacity);
        log::debug!(
            "Registered component `{}` as {type_id} (capacity {capacity})",
            type_name::<T>()
        );
        Ok(type_id)
    }

    /// Id assigned to `T` at registration.
    pub fn component_type_id<T: Component>(&self) -> Result<ComponentTypeId, EcsError> {
        Ok(self.storage.type_id_of::<T>()?)
    }

    /// Returns `true` if `T` has been registered.
    pub fn is_registered<T: Component>(&self) -> bool {
        self.storage.contains::<T>()
    }

    /// The table storing every `T`.
    pub fn component_table<T: Component>(&self) -> Result<&ComponentTable, EcsError> {
        let type_id = self.storage.type_id_of::<T>()?;
        Ok(self.storage.table(type_id))
    }

    /// Number of live `T` values.
    pub fn component_count<T: Component>(&self) -> Result<usize, EcsError> {
        Ok(self.component_table::<T>()?.len())
    }

    // --- Entities ---

    /// Allocates a new entity with no component.
    pub fn create_entity(&mut self) -> Result<EntityId, EcsError> {
        self.assert_owner_thread();
        let entity = self.entities.create().map_err(|err| {
            log::error!("Cannot create entity: {err}");
            EcsError::from(err)
        })?;
        log::trace!("Created {entity}");
        Ok(entity)
    }

    /// Destroys `entity`, releasing every component it owns and its spatial
    /// index leaf. The slot becomes reusable; `entity` never resolves again.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<(), EcsError> {
        self.assert_owner_thread();
        let metadata = self.entities.take_metadata(entity)?;

        let mut result = Ok(());
        for component in metadata.iter() {
            let table = self.storage.table_mut(component.type_id);
            if let Err(err) = table.release(component) {
                log::error!(
                    "Failed to release `{}` of {entity}: {err}",
                    table.type_name()
                );
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        if self.tree.contains(entity) {
            self.tree.remove(entity)?;
        }
        self.entities.vacate(entity.index as usize)?;
        log::trace!("Destroyed {entity}");
        result
    }

    /// Destroys whichever entity occupies slot `index` and returns its handle.
    ///
    /// Fails with [`NotFound::EmptySlot`] if the slot is vacant.
    pub fn destroy_entity_at(&mut self, index: u32) -> Result<EntityId, EcsError> {
        let entity = self
            .entities
            .handle_at(index as usize)
            .ok_or(NotFound::EmptySlot(index))?;
        self.destroy_entity(entity)?;
        Ok(entity)
    }

    /// Returns `true` if `entity` refers to a live entity.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    /// Handle of the entity occupying slot `index`.
    pub fn entity_at(&self, index: u32) -> Option<EntityId> {
        self.entities.handle_at(index as usize)
    }

    /// Iterates over live entities in slot order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().map(|(entity, _)| entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Maximum number of live entities.
    pub fn entity_capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Component references held by `entity`, in insertion order.
    pub fn components_of(&self, entity: EntityId) -> Result<Vec<ComponentRef>, EcsError> {
        Ok(self.entities.metadata(entity)?.iter().collect())
    }

    // --- Components ---

    /// Attaches `value` to `entity`.
    ///
    /// If the entity already has a `T`, nothing changes and the call succeeds;
    /// use [`overwrite_component`](Self::overwrite_component) to replace a value.
    pub fn add_component<T: Component>(&mut self, entity: EntityId, value: T) -> Result<(), EcsError> {
        self.assert_owner_thread();
        let type_id = self.storage.type_id_of::<T>()?;
        let metadata = self.entities.metadata_mut(entity)?;
        if metadata.contains(type_id) {
            return Ok(());
        }

        let component = self
            .storage
            .table_mut(type_id)
            .insert(entity, value)
            .inspect_err(|err| {
                if err.is_fatal() {
                    log::error!("Cannot add `{}` to {entity}: {err}", type_name::<T>());
                }
            })?;
        metadata.insert(component);
        Ok(())
    }

    /// Detaches and returns the `T` of `entity`.
    ///
    /// Removing a [`Collider`] or a [`Transform`] also drops the entity from
    /// the spatial index.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Result<T, EcsError> {
        self.assert_owner_thread();
        let type_id = self.storage.type_id_of::<T>()?;
        let metadata = self.entities.metadata_mut(entity)?;
        let component = metadata.get(type_id).ok_or(NotFound::Component {
            entity,
            component: type_name::<T>(),
        })?;

        let table = self.storage.table_mut(type_id);
        let value = *table.get::<T>(component)?;
        table.release(component)?;
        metadata.remove(type_id);

        let spatial = TypeId::of::<T>() == TypeId::of::<Collider>()
            || TypeId::of::<T>() == TypeId::of::<Transform>();
        if spatial && self.tree.contains(entity) {
            self.tree.remove(entity)?;
            if let Ok(collider) = self.get_component_mut::<Collider>(entity) {
                collider.in_tree = false;
            }
            log::trace!("{entity} left the spatial index");
        }
        Ok(value)
    }

    /// Returns `true` if `entity` is alive and has a `T`.
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        let Ok(type_id) = self.storage.type_id_of::<T>() else {
            return false;
        };
        self.entities
            .metadata(entity)
            .is_ok_and(|metadata| metadata.contains(type_id))
    }

    /// Returns a copy of the `T` of `entity`.
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Result<T, EcsError> {
        let (type_id, component) = self.component_ref::<T>(entity)?;
        Ok(*self.storage.table(type_id).get::<T>(component)?)
    }

    /// Returns the `T` of `entity` mutably.
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Result<&mut T, EcsError> {
        self.assert_owner_thread();
        let (type_id, component) = self.component_ref::<T>(entity)?;
        self.storage.table_mut(type_id).get_mut::<T>(component)
    }

    /// Replaces the `T` of `entity` in place.
    pub fn overwrite_component<T: Component>(&mut self, entity: EntityId, value: T) -> Result<(), EcsError> {
        *self.get_component_mut::<T>(entity)? = value;
        Ok(())
    }

    /// Runs `f` on the `T` of `entity`.
    pub fn with_component<T, R>(
        &mut self,
        entity: EntityId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, EcsError>
    where
        T: Component,
    {
        Ok(f(self.get_component_mut::<T>(entity)?))
    }

    /// Runs `f` on the `A` and the `B` of `entity`.
    pub fn with_components2<A, B, R>(
        &mut self,
        entity: EntityId,
        f: impl FnOnce(&mut A, &mut B) -> R,
    ) -> Result<R, EcsError>
    where
        A: Component,
        B: Component,
    {
        self.assert_owner_thread();
        let (a, ra) = self.component_ref::<A>(entity)?;
        let (b, rb) = self.component_ref::<B>(entity)?;
        let [ta, tb] = self.storage.tables_mut([a, b])?;
        Ok(f(ta.get_mut::<A>(ra)?, tb.get_mut::<B>(rb)?))
    }

    fn component_ref<T: Component>(
        &self,
        entity: EntityId,
    ) -> Result<(ComponentTypeId, ComponentRef), EcsError> {
        let type_id = self.storage.type_id_of::<T>()?;
        let component = self
            .entities
            .metadata(entity)?
            .get(type_id)
            .ok_or(NotFound::Component {
                entity,
                component: type_name::<T>(),
            })?;
        Ok((type_id, component))
    }

    // --- Owned subsystems ---

    /// The configuration the world was created with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The registry of tables.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// The asset-name table.
    pub fn assets(&self) -> &AssetTable {
        &self.assets
    }

    /// The asset-name table, mutably.
    pub fn assets_mut(&mut self) -> &mut AssetTable {
        self.assert_owner_thread();
        &mut self.assets
    }

    /// The spatial index of collider boxes, keyed by entity.
    pub fn spatial_index(&self) -> &DynamicTree<EntityId> {
        &self.tree
    }

    /// The spatial index, mutably.
    pub fn spatial_index_mut(&mut self) -> &mut DynamicTree<EntityId> {
        self.assert_owner_thread();
        &mut self.tree
    }

    // --- Thread ownership ---

    /// Panics if called from a thread other than the world's owner.
    #[track_caller]
    pub fn assert_owner_thread(&self) {
        let current = thread::current().id();
        assert!(
            current == self.owner,
            "World owned by {:?} was accessed from {:?}; call rebind_owner_thread after moving it",
            self.owner,
            current
        );
    }

    /// Makes the calling thread the world's owner.
    pub fn rebind_owner_thread(&mut self) {
        let current = thread::current().id();
        if current != self.owner {
            log::debug!("World ownership moved from {:?} to {:?}", self.owner, current);
            self.owner = current;
        }
    }
}
