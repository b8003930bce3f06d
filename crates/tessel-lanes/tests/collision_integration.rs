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


use tessel_core::math::{Aabb, Vec2};
use tessel_data::ecs::{Collider, EntityId, PhysicsBody, Transform, World};
use tessel_data::WorldConfig;
use tessel_lanes::physics_lane::{
    run_collision_pass, BroadphaseLane, CollisionPair, MotionLane, NarrowphaseLane,
    PhysicsLaneConfig, StandardPhysicsLane,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_world() -> World {
    World::new(WorldConfig {
        entity_capacity: 32,
        default_component_capacity: 32,
        ..WorldConfig::default()
    })
}

fn spawn_box(world: &mut World, aabb: Aabb) -> EntityId {
    let entity = world.create_entity().unwrap();
    world.add_component(entity, Transform::from_aabb(aabb)).unwrap();
    world.add_component(entity, Collider::square()).unwrap();
    entity
}

/// A, B overlapping and C far away.
fn abc(world: &mut World) -> (EntityId, EntityId, EntityId) {
    let a = spawn_box(world, Aabb::new(0.0, 0.0, 10.0, 10.0));
    let b = spawn_box(world, Aabb::new(5.0, 5.0, 15.0, 15.0));
    let c = spawn_box(world, Aabb::new(100.0, 100.0, 110.0, 110.0));
    (a, b, c)
}

#[test]
fn test_collision_pass_reports_both_directions() {
    init_logger();
    let mut world = test_world();
    let (a, b, c) = abc(&mut world);

    let pairs = run_collision_pass(&mut world).unwrap();

    assert_eq!(pairs.len(), 2, "A/B overlap is reported once per side: {pairs:?}");
    assert!(pairs.contains(&CollisionPair::new(a, b)));
    assert!(pairs.contains(&CollisionPair::new(b, a)));
    assert!(pairs.iter().all(|p| p.entity != c && p.other != c));
    assert!(pairs.iter().all(|p| p.entity != p.other), "no self pairs");
}

#[test]
fn test_collision_pass_tracks_colliders() {
    init_logger();
    let mut world = test_world();
    let (a, b, c) = abc(&mut world);

    // A transform without a collider is never tracked.
    let loose = world.create_entity().unwrap();
    world
        .add_component(loose, Transform::from_aabb(Aabb::new(0.0, 0.0, 10.0, 10.0)))
        .unwrap();

    run_collision_pass(&mut world).unwrap();

    let tree = world.spatial_index();
    assert_eq!(tree.len(), 3);
    assert!(tree.contains(a) && tree.contains(b) && tree.contains(c));
    assert!(!tree.contains(loose));
    assert!(tree.validate());
    for entity in [a, b, c] {
        assert!(world.get_component::<Collider>(entity).unwrap().in_tree);
    }
}

#[test]
fn test_collision_pass_resyncs_moved_entities() {
    init_logger();
    let mut world = test_world();
    let (a, b, _) = abc(&mut world);
    assert_eq!(run_collision_pass(&mut world).unwrap().len(), 2);

    // Move B next to C, out of A's reach.
    let moved = Aabb::new(105.0, 105.0, 115.0, 115.0);
    world.overwrite_component(b, Transform::from_aabb(moved)).unwrap();
    let pairs = run_collision_pass(&mut world).unwrap();

    assert_eq!(world.spatial_index().leaf_aabb(b), Some(moved));
    assert!(pairs.iter().all(|p| p.entity != a && p.other != a), "A is alone now");
    assert_eq!(pairs.len(), 2, "B and C overlap: {pairs:?}");
    assert!(world.spatial_index().validate());
}

#[test]
fn test_collision_pass_small_move_keeps_leaf() {
    init_logger();
    let mut world = test_world();
    let (a, _, _) = abc(&mut world);
    run_collision_pass(&mut world).unwrap();
    let node = world.spatial_index().node_of(a);

    // Shrinking stays inside the stored box.
    world
        .overwrite_component(a, Transform::from_aabb(Aabb::new(1.0, 1.0, 9.0, 9.0)))
        .unwrap();
    run_collision_pass(&mut world).unwrap();

    assert_eq!(world.spatial_index().node_of(a), node);
    assert_eq!(
        world.spatial_index().leaf_aabb(a),
        Some(Aabb::new(0.0, 0.0, 10.0, 10.0)),
        "the fattened box is kept"
    );
}

#[test]
fn test_collision_pass_forgets_destroyed_and_uncollided_entities() {
    init_logger();
    let mut world = test_world();
    let (a, b, c) = abc(&mut world);
    run_collision_pass(&mut world).unwrap();

    world.destroy_entity(b).unwrap();
    world.remove_component::<Collider>(c).unwrap();
    let pairs = run_collision_pass(&mut world).unwrap();

    assert!(pairs.is_empty());
    let tree = world.spatial_index();
    assert_eq!(tree.len(), 1);
    assert!(tree.contains(a));
    assert!(!tree.contains(b) && !tree.contains(c));
}

#[test]
fn test_narrowphase_rejects_rotated_miss() {
    init_logger();
    let mut world = test_world();
    spawn_box(&mut world, Aabb::new(0.0, 0.0, 10.0, 10.0));

    // Unrotated box is (8,5)-(12,7); turned half a circle it lands on (12,3)-(16,5).
    let c = world.create_entity().unwrap();
    let turned = Transform {
        origin: Vec2::new(4.0, 0.0),
        rotation: 180.0,
        ..Transform::new(Vec2::new(12.0, 5.0), Vec2::new(4.0, 2.0))
    };
    world.add_component(c, turned).unwrap();
    world.add_component(c, Collider::square()).unwrap();

    let candidates = BroadphaseLane::new().step(&mut world).unwrap();
    assert_eq!(candidates.len(), 2, "the broad phase sees the unrotated box");

    let verified = NarrowphaseLane::default()
        .verify(&mut world, &candidates, 0.016)
        .unwrap();
    assert!(verified.is_empty(), "got {verified:?}");
}

#[test]
fn test_narrowphase_keeps_real_contacts_and_skips_dead_entities() {
    init_logger();
    let mut world = test_world();
    let (a, b, _) = abc(&mut world);
    let candidates = run_collision_pass(&mut world).unwrap();

    let narrowphase = NarrowphaseLane::default();
    let verified = narrowphase.verify(&mut world, &candidates, 0.016).unwrap();
    assert_eq!(verified, candidates);

    world.destroy_entity(a).unwrap();
    let verified = narrowphase.verify(&mut world, &candidates, 0.016).unwrap();
    assert!(verified.is_empty());
    assert!(world.is_alive(b));
}

#[test]
fn test_narrowphase_pushes_contacts_apart() {
    init_logger();
    let mut world = test_world();
    let (a, b, _) = abc(&mut world);
    let candidates = run_collision_pass(&mut world).unwrap();
    let before = world.get_component::<Transform>(a).unwrap().position
        - world.get_component::<Transform>(b).unwrap().position;

    let narrowphase = NarrowphaseLane::new(PhysicsLaneConfig {
        physics_enabled: true,
        verify_contacts: true,
    });
    narrowphase.verify(&mut world, &candidates, 1.0).unwrap();

    let pa = world.get_component::<Transform>(a).unwrap().position;
    let pb = world.get_component::<Transform>(b).unwrap().position;
    assert!(pa.x < 0.0 && pa.y < 0.0, "A backs away from B: {pa:?}");
    assert!(pb.x > 5.0 && pb.y > 5.0, "B backs away from A: {pb:?}");
    assert!((pa - pb).length() > before.length());
}

#[test]
fn test_motion_lane_integrates_bodies() {
    init_logger();
    let mut world = test_world();
    let moving = spawn_box(&mut world, Aabb::new(0.0, 0.0, 1.0, 1.0));
    world
        .add_component(
            moving,
            PhysicsBody {
                velocity: Vec2::new(2.0, 0.0),
                acceleration: Vec2::new(0.0, 1.0),
            },
        )
        .unwrap();
    let still = spawn_box(&mut world, Aabb::new(5.0, 5.0, 6.0, 6.0));

    MotionLane::new().step(&mut world, 0.5).unwrap();

    let body = world.get_component::<PhysicsBody>(moving).unwrap();
    assert_eq!(body.velocity, Vec2::new(2.0, 0.5));
    let transform = world.get_component::<Transform>(moving).unwrap();
    assert_eq!(transform.position, Vec2::new(1.0, 0.25));
    assert_eq!(
        world.get_component::<Transform>(still).unwrap().position,
        Vec2::new(5.0, 5.0)
    );
}

#[test]
fn test_standard_lane_detects_approaching_bodies() {
    init_logger();
    let mut world = test_world();
    let left = spawn_box(&mut world, Aabb::new(0.0, 0.0, 1.0, 1.0));
    let right = spawn_box(&mut world, Aabb::new(4.0, 0.0, 5.0, 1.0));
    world
        .add_component(left, PhysicsBody::with_velocity(Vec2::new(1.0, 0.0)))
        .unwrap();
    let lane = StandardPhysicsLane::new(PhysicsLaneConfig::default());

    let first = lane.step(&mut world, 1.0).unwrap();
    assert!(first.candidates.is_empty());

    // The gap of three units closes within a few more ticks.
    let mut contacts = Vec::new();
    for _ in 0..4 {
        let report = lane.step(&mut world, 1.0).unwrap();
        if !report.contacts.is_empty() {
            contacts = report.contacts;
            break;
        }
    }
    assert!(contacts.contains(&CollisionPair::new(left, right)));
    assert!(contacts.contains(&CollisionPair::new(right, left)));
}

#[test]
fn test_standard_lane_without_verification_reports_candidates() {
    init_logger();
    let mut world = test_world();
    abc(&mut world);
    let lane = StandardPhysicsLane::new(PhysicsLaneConfig {
        physics_enabled: false,
        verify_contacts: false,
    });

    let report = lane.step(&mut world, 0.016).unwrap();

    assert_eq!(report.candidates.len(), 2);
    assert_eq!(report.contacts, report.candidates);
    assert_eq!(report.candidates[0].flipped(), report.candidates[1]);
}

#[test]
fn test_collision_pass_uses_current_boxes_after_shrink() {
    init_logger();
    let mut world = test_world();
    let a = spawn_box(&mut world, Aabb::new(0.0, 0.0, 10.0, 10.0));
    let b = spawn_box(&mut world, Aabb::new(12.0, 0.0, 20.0, 10.0));
    assert!(run_collision_pass(&mut world).unwrap().is_empty());

    // A shrinks inside the box the tree keeps for it; B grows into that
    // stored box but not into A's current one.
    world
        .overwrite_component(a, Transform::from_aabb(Aabb::new(0.0, 0.0, 5.0, 5.0)))
        .unwrap();
    world
        .overwrite_component(b, Transform::from_aabb(Aabb::new(8.0, 0.0, 20.0, 10.0)))
        .unwrap();
    let pairs = run_collision_pass(&mut world).unwrap();

    assert_eq!(
        world.spatial_index().leaf_aabb(a),
        Some(Aabb::new(0.0, 0.0, 10.0, 10.0)),
        "A was not reinserted"
    );
    assert!(pairs.is_empty(), "current boxes do not touch: {pairs:?}");
}

#[test]
fn test_collision_pass_matches_brute_force_over_moves() {
    init_logger();
    let mut world = World::new(WorldConfig {
        entity_capacity: 128,
        default_component_capacity: 128,
        ..WorldConfig::default()
    });
    let mut rng = fastrand::Rng::with_seed(0xC011DE);
    let random_box = |rng: &mut fastrand::Rng| {
        let x = rng.f32() * 150.0;
        let y = rng.f32() * 150.0;
        Aabb::new(x, y, x + 2.0 + rng.f32() * 20.0, y + 2.0 + rng.f32() * 20.0)
    };
    let entities: Vec<EntityId> = (0..100)
        .map(|_| spawn_box(&mut world, random_box(&mut rng)))
        .collect();

    for round in 0..30 {
        for &entity in &entities {
            let current = world.get_component::<Transform>(entity).unwrap().bounding_box();
            let next = match rng.u8(0..3) {
                // Shrink in place: the tree keeps the old box.
                0 => {
                    let dx = rng.f32() * current.width() * 0.5;
                    let dy = rng.f32() * current.height() * 0.5;
                    Aabb::new(current.min.x + dx, current.min.y + dy, current.max.x, current.max.y)
                }
                1 => random_box(&mut rng),
                _ => current,
            };
            world.overwrite_component(entity, Transform::from_aabb(next)).unwrap();
        }

        let mut pairs = run_collision_pass(&mut world).unwrap();
        pairs.sort_by_key(|p| (p.entity.id, p.other.id));

        let boxes: Vec<(EntityId, Aabb)> = entities
            .iter()
            .map(|&e| (e, world.get_component::<Transform>(e).unwrap().bounding_box()))
            .collect();
        let mut expected = Vec::new();
        for &(entity, aabb) in &boxes {
            for &(other, other_box) in &boxes {
                if entity != other && aabb.overlaps(&other_box) {
                    expected.push(CollisionPair::new(entity, other));
                }
            }
        }
        expected.sort_by_key(|p| (p.entity.id, p.other.id));

        assert_eq!(pairs, expected, "round {round} disagrees with brute force");
        assert!(world.spatial_index().validate());
    }
}
