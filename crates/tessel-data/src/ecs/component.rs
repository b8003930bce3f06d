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

use std::fmt;

/// A marker trait for types that can be stored in a component table.
///
/// Components are plain values: they are copied in and out of their table's
/// heap payloads, so they must be `Copy`. The `'static` lifetime ensures that
/// the component type does not contain any non-static references, and
/// `Send + Sync` keep the world itself `Send`.
///
/// Implement it with `#[derive(Component)]`.
pub trait Component: 'static + Copy + Send + Sync {}

/// Small integer identifying a registered component type.
///
/// Ids are handed out in registration order starting at zero; the id is also
/// the index of the type's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, bytemuck::Zeroable)]
pub struct ComponentTypeId(pub u16);

impl ComponentTypeId {
    /// The id as a table index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}
