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


//! Physics Lane
//!
//! The physics lane keeps the world's spatial index in sync with the ECS and
//! turns it into collision records each tick.

mod native_lanes;

pub use native_lanes::*;

use serde::{Deserialize, Serialize};
use tessel_data::ecs::World;
use tessel_data::EcsError;

/// Switches for the physics lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsLaneConfig {
    /// Push verified contacts apart after narrow-phase.
    pub physics_enabled: bool,
    /// Run narrow-phase at all. When off, broad-phase records are reported as contacts.
    pub verify_contacts: bool,
}

impl Default for PhysicsLaneConfig {
    fn default() -> Self {
        Self {
            physics_enabled: false,
            verify_contacts: true,
        }
    }
}

/// What a single [`StandardPhysicsLane::step`] found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Every broad-phase record, `(A, B)` and `(B, A)` both included.
    pub candidates: Vec<CollisionPair>,
    /// Records that survived narrow-phase.
    pub contacts: Vec<CollisionPair>,
}

/// The standard physics lane: motion, then broad-phase, then narrow-phase.
#[derive(Debug, Default)]
pub struct StandardPhysicsLane {
    config: PhysicsLaneConfig,
    motion: MotionLane,
    broadphase: BroadphaseLane,
    narrowphase: NarrowphaseLane,
}

impl StandardPhysicsLane {
    /// Creates a new `StandardPhysicsLane`.
    pub fn new(config: PhysicsLaneConfig) -> Self {
        Self {
            config,
            motion: MotionLane::new(),
            broadphase: BroadphaseLane::new(),
            narrowphase: NarrowphaseLane::new(config),
        }
    }

    /// The configuration this lane was built with.
    pub fn config(&self) -> &PhysicsLaneConfig {
        &self.config
    }

    /// Advances the world by `dt` seconds and reports its collisions.
    pub fn step(&self, world: &mut World, dt: f32) -> Result<CollisionReport, EcsError> {
        self.motion.step(world, dt)?;
        let candidates = self.broadphase.step(world)?;
        let contacts = if self.config.verify_contacts {
            self.narrowphase.verify(world, &candidates, dt)?
        } else {
            candidates.clone()
        };
        log::trace!(
            "physics step: {} candidates, {} contacts",
            candidates.len(),
            contacts.len()
        );
        Ok(CollisionReport {
            candidates,
            contacts,
        })
    }
}
