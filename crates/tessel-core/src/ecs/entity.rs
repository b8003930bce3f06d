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

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A unique identifier for an entity in the world.
///
/// `id` is assigned from a monotonically increasing counter and is never reused,
/// so equality and hashing look at `id` alone. `index` and `generation` locate
/// the entity's slot: when an entity is destroyed its slot can be recycled, but
/// the slot's generation is bumped, so a stale handle no longer resolves.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, bytemuck::Zeroable)]
pub struct EntityId {
    /// World-unique identifier. `0` is reserved for [`EntityId::NULL`].
    pub id: u64,
    /// Index of the entity's slot in the entity store.
    pub index: u32,
    /// Generation of that slot when the handle was issued.
    pub generation: u32,
}

impl EntityId {
    /// The handle that never refers to a live entity.
    pub const NULL: Self = Self {
        id: 0,
        index: 0,
        generation: 0,
    };

    /// Returns `true` for [`EntityId::NULL`].
    #[inline]
    pub fn is_null(&self) -> bool {
        self.id == 0
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityId {}

impl Hash for EntityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity#{}[{}v{}]", self.id, self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_is_the_id() {
        let a = EntityId {
            id: 5,
            index: 1,
            generation: 0,
        };
        let moved = EntityId {
            id: 5,
            index: 9,
            generation: 3,
        };
        let other = EntityId { id: 6, ..a };
        assert_eq!(a, moved);
        assert_ne!(a, other);

        let set: HashSet<_> = [a, moved, other].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_null_handle() {
        assert!(EntityId::NULL.is_null());
        assert!(EntityId::default().is_null());
        assert!(!EntityId {
            id: 1,
            index: 0,
            generation: 0
        }
        .is_null());
    }
}
