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

//! World sizing configuration.

use serde::{Deserialize, Serialize};

use crate::EcsError;

/// Capacities used when a [`World`](crate::ecs::World) is created.
///
/// Every field has a default, so a RON document only needs to name the
/// values it changes:
///
/// ```
/// let config = tessel_data::WorldConfig::from_ron_str("(entity_capacity: 16)").unwrap();
/// assert_eq!(config.entity_capacity, 16);
/// assert_eq!(config.tree_initial_nodes(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of component types the registry can hold.
    pub registry_capacity: usize,
    /// Maximum number of simultaneously live entities.
    pub entity_capacity: usize,
    /// Capacity of the built-in component tables.
    pub default_component_capacity: usize,
    /// Maximum number of named assets.
    pub asset_capacity: usize,
    /// Initial size of the spatial index node pool. Defaults to `entity_capacity`.
    pub tree_initial_nodes: Option<usize>,
    /// Nodes added each time the pool runs out. Defaults to the initial size.
    pub tree_growth: Option<usize>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            registry_capacity: 64,
            entity_capacity: 1024,
            default_component_capacity: 1024,
            asset_capacity: 64,
            tree_initial_nodes: None,
            tree_growth: None,
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, EcsError> {
        Ok(ron::from_str(source)?)
    }

    /// Effective initial size of the spatial index node pool.
    pub fn tree_initial_nodes(&self) -> usize {
        self.tree_initial_nodes.unwrap_or(self.entity_capacity).max(1)
    }

    /// Effective growth increment of the spatial index node pool.
    pub fn tree_growth(&self) -> usize {
        self.tree_growth.unwrap_or_else(|| self.tree_initial_nodes()).max(1)
    }
}
