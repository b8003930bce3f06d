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


// Tessel Sandbox
// Drops a grid of boxes with random-ish velocities into a world and runs the
// physics lane over them for a fixed number of ticks.
//
// Usage: sandbox [config.ron]

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tessel_core::math::{Aabb, Vec2};
use tessel_core::memory::block_stats;
use tessel_data::ecs::{Collider, PhysicsBody, Transform, World};
use tessel_data::WorldConfig;
use tessel_lanes::physics_lane::{PhysicsLaneConfig, StandardPhysicsLane};

const BOX_SIZE: f32 = 16.0;
const SPACING: f32 = 20.0;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SandboxConfig {
    world: WorldConfig,
    physics: PhysicsLaneConfig,
    columns: u32,
    rows: u32,
    ticks: u32,
    dt: f32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            physics: PhysicsLaneConfig {
                physics_enabled: true,
                verify_contacts: true,
            },
            columns: 10,
            rows: 10,
            ticks: 60,
            dt: 1.0 / 60.0,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SandboxConfig> {
    let Some(path) = path else {
        log::info!("No config given, using defaults");
        return Ok(SandboxConfig::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = ron::from_str(&source).with_context(|| format!("parsing {}", path.display()))?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

fn populate(world: &mut World, config: &SandboxConfig) -> Result<()> {
    let sprite = world.assets_mut().try_add("box.png")?;
    log::debug!("Box sprite registered as {:?}", sprite);

    for row in 0..config.rows {
        for column in 0..config.columns {
            let x = column as f32 * SPACING;
            let y = row as f32 * SPACING;
            // Alternate columns drift towards each other.
            let direction = if column % 2 == 0 { 1.0 } else { -1.0 };
            let drift = (row as f32 - config.rows as f32 / 2.0) * 2.0;
            let velocity = Vec2::new(direction * 30.0, drift);

            let entity = world.create_entity()?;
            world.add_component(
                entity,
                Transform::from_aabb(Aabb::new(x, y, x + BOX_SIZE, y + BOX_SIZE)),
            )?;
            world.add_component(entity, Collider::square())?;
            world.add_component(entity, PhysicsBody::with_velocity(velocity))?;
        }
    }
    log::info!("Spawned {} boxes", world.entity_count());
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = std::env::args().nth(1);
    let config = load_config(path.as_deref().map(Path::new))?;

    let mut world = World::new(config.world.clone());
    populate(&mut world, &config)?;

    let lane = StandardPhysicsLane::new(config.physics);
    let mut total_contacts = 0usize;
    for tick in 0..config.ticks {
        let report = lane.step(&mut world, config.dt)?;
        total_contacts += report.contacts.len();
        if !report.contacts.is_empty() {
            log::debug!(
                "tick {tick}: {} candidates, {} contacts",
                report.candidates.len(),
                report.contacts.len()
            );
        }
    }

    let tree = world.spatial_index();
    let stats = block_stats();
    log::info!(
        "{} ticks done: {} contact records, tree holds {} leaves in {} nodes",
        config.ticks,
        total_contacts,
        tree.len(),
        tree.node_count()
    );
    log::info!(
        "blocks: {} live ({} bytes, peak {}), {} allocated, {} resized, {} released",
        stats.live_blocks,
        stats.live_bytes,
        stats.peak_bytes,
        stats.total_allocations,
        stats.total_resizes,
        stats.total_releases
    );
    Ok(())
}
