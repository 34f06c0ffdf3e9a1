//! Integration tests for prefabs and game object pools.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test pool_integration
//! ```

use std::sync::Arc;

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;
use bevy_ecs::world::EntityWorldMut;
use glam::Vec2;

use harrierengine::components::inactive::Inactive;
use harrierengine::components::rectanglecollider::RectangleCollider;
use harrierengine::components::transform2d::Transform2D;
use harrierengine::hierarchy;
use harrierengine::pool::{GameObjectPool, GrowthPolicy, PoolError, Prefab, instantiate};
use harrierengine::resources::prefabstore::PrefabStore;

#[derive(Component)]
struct Crate;

#[derive(Component)]
struct Lid;

/// A collider with a child object, standing in for an expensive game object.
struct CratePrefab;

impl Prefab for CratePrefab {
    fn name(&self) -> &str {
        "crate"
    }

    fn configure(&self, entity: &mut EntityWorldMut) {
        let root = entity.id();
        entity.insert((Crate, RectangleCollider::new(16.0, 16.0)));
        entity.world_scope(|world| {
            world.spawn((Lid, Transform2D::new(0.0, -8.0), ChildOf(root)));
        });
    }
}

fn crate_pool(world: &mut World, size: usize, policy: GrowthPolicy) -> GameObjectPool {
    GameObjectPool::with_policy(world, Arc::new(CratePrefab), size, policy)
}

fn is_active(world: &World, entity: Entity) -> bool {
    world.get::<Inactive>(entity).is_none()
}

#[test]
fn instantiate_builds_prefab_with_children() {
    let mut world = World::new();
    let entity = instantiate(&mut world, &CratePrefab);

    assert!(world.get::<Crate>(entity).is_some());
    assert!(world.get::<Transform2D>(entity).is_some());
    assert!(is_active(&world, entity));
    let children = hierarchy::children_of(&world, entity);
    assert_eq!(children.len(), 1);
    assert!(world.get::<Lid>(children[0]).is_some());
}

#[test]
fn pool_of_two_hands_out_distinct_instances() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 2, GrowthPolicy::Fixed);
    assert_eq!(pool.capacity(), 2);
    assert_eq!(pool.available_count(), 2);

    let first = pool.get_game_object(&mut world).unwrap();
    let second = pool.get_game_object(&mut world).unwrap();

    assert_ne!(first, second);
    assert!(is_active(&world, first));
    assert!(is_active(&world, second));
    assert_eq!(pool.in_use_count(), 2);
    assert_eq!(pool.available_count(), 0);
}

#[test]
fn fixed_pool_reports_exhaustion() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 2, GrowthPolicy::Fixed);
    pool.get_game_object(&mut world).unwrap();
    pool.get_game_object(&mut world).unwrap();

    let err = pool.get_game_object(&mut world).unwrap_err();
    assert_eq!(
        err,
        PoolError::Exhausted {
            prefab: "crate".to_string(),
            capacity: 2
        }
    );
    assert_eq!(pool.capacity(), 2);
    assert_eq!(pool.in_use_count(), 2);
}

#[test]
fn growing_pool_builds_on_demand() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 2, GrowthPolicy::Grow { limit: None });
    let a = pool.get_game_object(&mut world).unwrap();
    let b = pool.get_game_object(&mut world).unwrap();
    let c = pool.get_game_object(&mut world).unwrap();

    assert!(a != c && b != c);
    assert_eq!(pool.capacity(), 3);
    assert!(world.get::<Crate>(c).is_some());
    assert!(is_active(&world, c));
}

#[test]
fn growth_limit_caps_capacity() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 1, GrowthPolicy::Grow { limit: Some(2) });
    pool.get_game_object(&mut world).unwrap();
    pool.get_game_object(&mut world).unwrap();

    assert!(matches!(
        pool.get_game_object(&mut world),
        Err(PoolError::Exhausted { capacity: 2, .. })
    ));
}

#[test]
fn returned_instance_is_parked_and_handed_out_next() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 2, GrowthPolicy::Fixed);
    let a = pool.get_game_object(&mut world).unwrap();
    let b = pool.get_game_object(&mut world).unwrap();

    pool.return_game_object(&mut world, a).unwrap();
    assert!(!is_active(&world, a));
    assert!(pool.is_available(a));
    assert_eq!(pool.available_count(), 1);

    let again = pool.get_game_object(&mut world).unwrap();
    assert_eq!(again, a);
    assert!(is_active(&world, again));

    pool.return_game_object(&mut world, b).unwrap();
    pool.return_game_object(&mut world, a).unwrap();
    // Last in, first out
    assert_eq!(pool.get_game_object(&mut world).unwrap(), a);
    assert_eq!(pool.get_game_object(&mut world).unwrap(), b);
}

#[test]
fn returning_keeps_gameplay_state() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 1, GrowthPolicy::Fixed);
    let parent = world.spawn(Transform2D::new(10.0, 0.0)).id();
    let entity = pool.get_game_object(&mut world).unwrap();
    hierarchy::set_parent(&mut world, entity, Some(parent), false).unwrap();
    world.get_mut::<Transform2D>(entity).unwrap().position = Vec2::new(5.0, 5.0);

    pool.return_game_object(&mut world, entity).unwrap();

    assert_eq!(hierarchy::parent_of(&world, entity), Some(parent));
    assert_eq!(world.get::<Transform2D>(entity).unwrap().position, Vec2::new(5.0, 5.0));
    assert!(!hierarchy::is_active_in_hierarchy(&world, entity));
}

#[test]
fn foreign_entity_is_rejected_without_side_effects() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 2, GrowthPolicy::Fixed);
    let held = pool.get_game_object(&mut world).unwrap();
    let stranger = world.spawn(Transform2D::default()).id();
    let mut other_pool = crate_pool(&mut world, 1, GrowthPolicy::Fixed);
    let other = other_pool.get_game_object(&mut world).unwrap();

    assert_eq!(
        pool.return_game_object(&mut world, stranger),
        Err(PoolError::NotOwned(stranger))
    );
    assert_eq!(
        pool.return_game_object(&mut world, other),
        Err(PoolError::NotOwned(other))
    );
    assert!(world.get::<Inactive>(stranger).is_none());
    assert!(is_active(&world, other));
    assert_eq!(pool.capacity(), 2);
    assert_eq!(pool.available_count(), 1);
    assert_eq!(pool.in_use_count(), 1);
    assert!(pool.owns(held));
}

#[test]
fn double_return_is_rejected_and_pool_keeps_working() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 2, GrowthPolicy::Fixed);
    let a = pool.get_game_object(&mut world).unwrap();

    pool.return_game_object(&mut world, a).unwrap();
    assert_eq!(
        pool.return_game_object(&mut world, a),
        Err(PoolError::AlreadyAvailable(a))
    );
    assert_eq!(pool.available_count(), 2);
    assert_eq!(pool.in_use_count(), 0);

    let x = pool.get_game_object(&mut world).unwrap();
    let y = pool.get_game_object(&mut world).unwrap();
    assert_ne!(x, y);
    assert!(pool.get_game_object(&mut world).is_err());
}

#[test]
fn instance_destroyed_with_its_parent_is_forgotten() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 2, GrowthPolicy::Fixed);
    let parent = world.spawn(Transform2D::default()).id();
    let a = pool.get_game_object(&mut world).unwrap();
    hierarchy::set_parent(&mut world, a, Some(parent), false).unwrap();

    hierarchy::destroy(&mut world, parent).unwrap();

    assert_eq!(
        pool.return_game_object(&mut world, a),
        Err(PoolError::InstanceDespawned(a))
    );
    assert!(!pool.owns(a));
    assert_eq!(pool.capacity(), 1);
}

#[test]
fn parked_instance_despawned_externally_is_skipped() {
    let mut world = World::new();
    let mut pool = crate_pool(&mut world, 2, GrowthPolicy::Fixed);
    let a = pool.get_game_object(&mut world).unwrap();
    let b = pool.get_game_object(&mut world).unwrap();
    pool.return_game_object(&mut world, a).unwrap();
    pool.return_game_object(&mut world, b).unwrap();

    world.entity_mut(b).despawn();

    assert_eq!(pool.get_game_object(&mut world).unwrap(), a);
    assert!(!pool.owns(b));
    assert!(pool.get_game_object(&mut world).is_err());
}

#[test]
fn destroy_despawns_every_instance_and_child() {
    let mut world = World::new();
    let pool = crate_pool(&mut world, 3, GrowthPolicy::Fixed);
    world.spawn(Transform2D::default());

    pool.destroy(&mut world);

    let mut crates = world.query_filtered::<Entity, With<Crate>>();
    assert_eq!(crates.iter(&world).count(), 0);
    let mut lids = world.query_filtered::<Entity, With<Lid>>();
    assert_eq!(lids.iter(&world).count(), 0);
    let mut transforms = world.query::<&Transform2D>();
    assert_eq!(transforms.iter(&world).count(), 1);
}

#[test]
fn prefab_store_shares_prefabs_between_pools() {
    let mut world = World::new();
    let mut store = PrefabStore::new();
    store.insert(Arc::new(CratePrefab));
    assert!(store.contains("crate"));
    assert_eq!(store.len(), 1);

    let prefab = store.get("crate").unwrap();
    let first = GameObjectPool::new(&mut world, prefab.clone(), 1);
    let second = GameObjectPool::new(&mut world, prefab, 1);

    assert_eq!(first.prefab().name(), "crate");
    assert_eq!(second.policy(), GrowthPolicy::Grow { limit: None });
    assert!(store.get("missing").is_none());
}
