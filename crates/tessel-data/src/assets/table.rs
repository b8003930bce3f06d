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

use ahash::RandomState;

use crate::ecs::Table;
use crate::EcsError;

// Fixed seeds so a name hashes the same way in every world and every run.
const NAME_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Identifier of a named asset: the row it occupies in the [`AssetTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

#[derive(Debug, Clone, Copy, bytemuck::Zeroable)]
struct AssetRow {
    name_hash: u64,
}

/// A fixed-capacity table mapping asset names to stable ids.
///
/// Names are compared by their 64-bit hash.
pub struct AssetTable {
    rows: Table<AssetRow>,
    hasher: RandomState,
}

impl AssetTable {
    /// Creates an empty table with room for `capacity` names.
    pub fn with_capacity(capacity: usize) -> Self {
        let [k0, k1, k2, k3] = NAME_SEEDS;
        Self {
            rows: Table::with_capacity("asset", capacity),
            hasher: RandomState::with_seeds(k0, k1, k2, k3),
        }
    }

    /// Returns the id of `name`, adding it first if it is not known yet.
    pub fn try_add(&mut self, name: &str) -> Result<AssetId, EcsError> {
        if let Some(id) = self.find(name) {
            return Ok(id);
        }
        let name_hash = self.hash(name);
        let index = self.rows.set_next(AssetRow { name_hash }).map_err(|err| {
            log::error!("Cannot register asset `{name}`: {err}");
            EcsError::from(err)
        })?;
        log::trace!("Asset `{name}` registered as #{index}");
        Ok(AssetId(index as u32))
    }

    /// Returns the id of `name`, if it was added.
    pub fn find(&self, name: &str) -> Option<AssetId> {
        let name_hash = self.hash(name);
        self.rows
            .iter()
            .find(|(_, row)| row.name_hash == name_hash)
            .map(|(index, _)| AssetId(index as u32))
    }

    /// Forgets `name`. Its id may be handed to a later name.
    pub fn remove(&mut self, name: &str) -> Option<AssetId> {
        let id = self.find(name)?;
        self.rows.vacate(id.0 as usize).ok().flatten().map(|_| id)
    }

    /// Number of names stored.
    pub fn len(&self) -> usize {
        self.rows.entry_count()
    }

    /// Returns `true` if no name is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of names.
    pub fn capacity(&self) -> usize {
        self.rows.capacity()
    }

    fn hash(&self, name: &str) -> u64 {
        self.hasher.hash_one(name)
    }
}
