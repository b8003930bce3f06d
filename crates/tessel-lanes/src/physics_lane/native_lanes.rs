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


use tessel_core::math::Aabb;
use tessel_data::ecs::{Collider, EntityId, PhysicsBody, Transform, World};
use tessel_data::EcsError;

use super::PhysicsLaneConfig;

/// One collision record: `entity` overlaps `other`.
///
/// Records are directed. When A and B overlap, a pass emits both `(A, B)`
/// and `(B, A)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// The entity whose overlaps were queried.
    pub entity: EntityId,
    /// An entity found overlapping it.
    pub other: EntityId,
}

impl CollisionPair {
    /// Creates a new record.
    pub fn new(entity: EntityId, other: EntityId) -> Self {
        Self { entity, other }
    }

    /// The same contact seen from the other side.
    pub fn flipped(self) -> Self {
        Self::new(self.other, self.entity)
    }
}

/// Runs one broad-phase pass over `world` and returns its collision records.
pub fn run_collision_pass(world: &mut World) -> Result<Vec<CollisionPair>, EcsError> {
    BroadphaseLane::new().step(world)
}

/// The Motion Lane integrates `PhysicsBody` velocities into `Transform` positions.
#[derive(Debug, Default, Clone, Copy)]
pub struct MotionLane;

impl MotionLane {
    /// Creates a new `MotionLane`.
    pub fn new() -> Self {
        Self
    }

    /// Moves every body by `dt` seconds (semi-implicit Euler).
    pub fn step(&self, world: &mut World, dt: f32) -> Result<(), EcsError> {
        world.for_each2::<Transform, PhysicsBody>(|transform, body| {
            body.velocity += body.acceleration * dt;
            transform.position += body.velocity * dt;
        })
    }
}

/// The Broadphase Lane keeps the world's Dynamic AABB Tree in sync with every
/// entity that has both a `Transform` and a `Collider`, then lists the
/// overlaps the tree reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct BroadphaseLane;

impl BroadphaseLane {
    /// Creates a new `BroadphaseLane`.
    pub fn new() -> Self {
        Self
    }

    /// Executes the broad-phase step: updates the tree and generates collision records.
    pub fn step(&self, world: &mut World) -> Result<Vec<CollisionPair>, EcsError> {
        let tracked = self.sync_tree(world)?;
        self.generate_pairs(world, &tracked)
    }

    /// Inserts or refits one leaf per collider. Returns the synced entities
    /// with their current boxes, in slot order.
    fn sync_tree(&self, world: &mut World) -> Result<Vec<(EntityId, Aabb)>, EcsError> {
        let mut boxes: Vec<(EntityId, Aabb)> = Vec::new();
        world.for_each2_with_entity::<Transform, Collider>(|entity, transform, collider| {
            boxes.push((entity, transform.bounding_box()));
            collider.in_tree = true;
        })?;

        let tree = world.spatial_index_mut();
        let mut moved = 0usize;
        for &(entity, aabb) in &boxes {
            if tree.contains(entity) {
                if tree.update(entity, aabb)? {
                    moved += 1;
                }
            } else {
                tree.insert(entity, aabb)?;
            }
        }
        log::trace!(
            "broadphase: {} colliders synced, {} leaves reinserted",
            boxes.len(),
            moved
        );

        Ok(boxes)
    }

    /// Queries the tree with each current box. The tree keeps enlarged boxes
    /// for entities that shrank in place, so every hit is checked again
    /// against the other entity's current box.
    fn generate_pairs(
        &self,
        world: &World,
        tracked: &[(EntityId, Aabb)],
    ) -> Result<Vec<CollisionPair>, EcsError> {
        let mut current: Vec<Option<Aabb>> = vec![None; world.entity_capacity()];
        for &(entity, aabb) in tracked {
            current[entity.index as usize] = Some(aabb);
        }

        let tree = world.spatial_index();
        let mut pairs = Vec::new();
        for &(entity, aabb) in tracked {
            for other in tree.query_overlaps_with(entity, &aabb)? {
                let touches = current
                    .get(other.index as usize)
                    .copied()
                    .flatten()
                    .is_some_and(|other_box| other_box.overlaps(&aabb));
                if touches {
                    pairs.push(CollisionPair::new(entity, other));
                }
            }
        }
        Ok(pairs)
    }
}

/// The Narrowphase Lane tests broad-phase records against the exact rotated
/// and scaled rectangles, and optionally pushes touching bodies apart.
#[derive(Debug, Default, Clone, Copy)]
pub struct NarrowphaseLane {
    config: PhysicsLaneConfig,
}

impl NarrowphaseLane {
    /// Creates a new `NarrowphaseLane`.
    pub fn new(config: PhysicsLaneConfig) -> Self {
        Self { config }
    }

    /// Returns the records of `candidates` whose transforms really intersect.
    ///
    /// Records naming a destroyed entity, or one that has lost its
    /// `Transform` since broad-phase, are skipped. With
    /// [`physics_enabled`](PhysicsLaneConfig::physics_enabled) set, both
    /// entities of every verified record move `dt` units away from each other.
    pub fn verify(
        &self,
        world: &mut World,
        candidates: &[CollisionPair],
        dt: f32,
    ) -> Result<Vec<CollisionPair>, EcsError> {
        let mut verified = Vec::new();
        for &pair in candidates {
            if !world.has_component::<Transform>(pair.entity)
                || !world.has_component::<Transform>(pair.other)
            {
                continue;
            }

            let mut a = world.get_component::<Transform>(pair.entity)?;
            let mut b = world.get_component::<Transform>(pair.other)?;
            if !a.precise_intersects(&b) {
                continue;
            }
            verified.push(pair);

            if self.config.physics_enabled {
                let (pa, pb) = (a.position, b.position);
                a.position -= pa.direction_to(pb) * dt;
                b.position -= pb.direction_to(pa) * dt;
                world.overwrite_component(pair.entity, a)?;
                world.overwrite_component(pair.other, b)?;
            }
        }
        Ok(verified)
    }
}
