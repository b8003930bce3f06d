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

use serde::{Deserialize, Serialize};

use crate::ecs::Component;

/// Shape used by the narrow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ColliderKind {
    /// The entity's `Transform` rectangle.
    #[default]
    Square,
}

/// Marks an entity as taking part in collision detection.
///
/// The entity's `Transform` bounding box is tracked by the world's spatial
/// index once the collision pass has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Component, Serialize, Deserialize)]
pub struct Collider {
    /// Set by the collision pass once the entity has a leaf in the spatial index.
    pub in_tree: bool,
    /// Shape used by the narrow phase.
    pub kind: ColliderKind,
}

impl Collider {
    /// A square collider not yet tracked by the spatial index.
    pub fn square() -> Self {
        Self::default()
    }
}
