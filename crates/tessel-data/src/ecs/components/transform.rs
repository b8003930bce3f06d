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
use tessel_core::math::{Aabb, Vec2, DEG_TO_RAD};

use crate::ecs::Component;

/// A component that places a rectangle in world space.
///
/// `position` is where `origin` (a point in the rectangle's local space,
/// measured from its top-left corner) ends up. `rotation` is in degrees,
/// clockwise on a y-down screen.
#[derive(Debug, Clone, Copy, PartialEq, Component, Serialize, Deserialize)]
pub struct Transform {
    /// World position of the origin point.
    pub position: Vec2,
    /// Width and height of the rectangle.
    pub size: Vec2,
    /// Local pivot for position, rotation and scale.
    pub origin: Vec2,
    /// Rotation around the origin, in degrees.
    pub rotation: f32,
    /// Scale around the origin.
    pub scale: Vec2,
}

impl Transform {
    /// Creates an unrotated, unscaled rectangle whose top-left corner is at `position`.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            origin: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }

    /// Creates a rectangle whose center is at `position`.
    pub fn centered(position: Vec2, size: Vec2) -> Self {
        Self {
            origin: size * 0.5,
            ..Self::new(position, size)
        }
    }

    /// Creates a transform whose [`bounding_box`](Self::bounding_box) is exactly `aabb`.
    pub fn from_aabb(aabb: Aabb) -> Self {
        Self::new(aabb.min, aabb.max - aabb.min)
    }

    /// The unrotated, unscaled box `[position - origin, position + size - origin]`.
    ///
    /// This is the box the broad phase tracks.
    pub fn bounding_box(&self) -> Aabb {
        let min = self.position - self.origin;
        Aabb {
            min,
            max: min + self.size,
        }
    }

    /// Maps a point from the rectangle's local space into world space.
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        let angle = -self.rotation * DEG_TO_RAD;
        let (sin, cos) = angle.sin_cos();
        let d = local - self.origin;
        Vec2::new(
            self.scale.x * cos * d.x + self.scale.y * sin * d.y + self.position.x,
            -self.scale.x * sin * d.x + self.scale.y * cos * d.y + self.position.y,
        )
    }

    /// Axis-aligned box enclosing the rotated and scaled rectangle.
    pub fn global_bounds(&self) -> Aabb {
        let corners = [
            Vec2::ZERO,
            Vec2::new(self.size.x, 0.0),
            Vec2::new(0.0, self.size.y),
            self.size,
        ]
        .map(|corner| self.transform_point(corner));
        Aabb::from_points(&corners).unwrap_or_default()
    }

    /// Narrow-phase test on [`global_bounds`](Self::global_bounds).
    pub fn precise_intersects(&self, other: &Transform) -> bool {
        self.global_bounds().overlaps(&other.global_bounds())
    }
}

impl Default for Transform {
    /// A zero-sized rectangle at the world origin.
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO)
    }
}
