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

//! Errors raised by the data layer.

use std::fmt;

use tessel_core::ecs::EntityId;
use tessel_core::CoreError;
use thiserror::Error;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    /// The handle does not refer to a live entity (never created, destroyed or stale).
    Entity(EntityId),
    /// The entity is alive but carries no component of this type.
    Component {
        /// The entity that was queried.
        entity: EntityId,
        /// Name of the missing component type.
        component: &'static str,
    },
    /// The component type was never registered with the world.
    UnregisteredType(&'static str),
    /// No entity occupies the given slot.
    EmptySlot(u32),
    /// A component reference points at a vacated or recycled slot.
    StaleComponent,
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::Entity(entity) => write!(f, "{entity} is not alive"),
            NotFound::Component { entity, component } => {
                write!(f, "{entity} has no `{component}` component")
            }
            NotFound::UnregisteredType(name) => write!(f, "component type `{name}` is not registered"),
            NotFound::EmptySlot(index) => write!(f, "entity slot {index} is empty"),
            NotFound::StaleComponent => write!(f, "component reference is stale"),
        }
    }
}

/// Errors raised by [`World`](crate::ecs::World) operations.
#[derive(Debug, Error)]
pub enum EcsError {
    /// A fixed-capacity table is full.
    #[error("{table} table is full (capacity {capacity})")]
    CapacityExceeded {
        /// Name of the table.
        table: &'static str,
        /// Its capacity.
        capacity: usize,
    },
    /// A lookup failed.
    #[error("not found: {0}")]
    NotFound(NotFound),
    /// A component table was accessed with the wrong Rust type.
    #[error("type mismatch: table stores `{expected}`, accessed as `{found}`")]
    TypeMismatch {
        /// Type stored by the table.
        expected: &'static str,
        /// Type used for the access.
        found: &'static str,
    },
    /// An index lies outside a table.
    #[error("index {index} is out of range (capacity {capacity})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Capacity of the table.
        capacity: usize,
    },
    /// The component type has already been registered.
    #[error("component type `{0}` is already registered")]
    AlreadyRegistered(&'static str),
    /// The same component type was requested twice by one multi-type access.
    #[error("component type `{0}` requested more than once in a single access")]
    AliasedComponents(&'static str),
    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ron::error::SpannedError),
    /// Any other low-level container error.
    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for EcsError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CapacityExceeded { what, capacity } => EcsError::CapacityExceeded {
                table: what,
                capacity,
            },
            CoreError::IndexOutOfRange { index, capacity } => {
                EcsError::IndexOutOfRange { index, capacity }
            }
            other => EcsError::Core(other),
        }
    }
}

impl From<NotFound> for EcsError {
    fn from(err: NotFound) -> Self {
        EcsError::NotFound(err)
    }
}

impl EcsError {
    /// Returns `true` for errors that indicate a sizing or programming mistake
    /// rather than an expected miss.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EcsError::CapacityExceeded { .. }
                | EcsError::TypeMismatch { .. }
                | EcsError::AliasedComponents(_)
                | EcsError::Core(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_onto_ecs_variants() {
        let err: EcsError = CoreError::CapacityExceeded {
            what: "entity",
            capacity: 4,
        }
        .into();
        assert!(matches!(
            err,
            EcsError::CapacityExceeded {
                table: "entity",
                capacity: 4
            }
        ));
        assert!(err.is_fatal());

        let err: EcsError = CoreError::DuplicateKey.into();
        assert!(matches!(err, EcsError::Core(CoreError::DuplicateKey)));

        let err: EcsError = NotFound::EmptySlot(3).into();
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "not found: entity slot 3 is empty");
    }
}
