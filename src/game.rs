//! Headless demo scene.
//!
//! A scrolling world root carries obstacles (trees, bushes and rocks) toward
//! the player. An obstacle factory takes instances from one pool per prefab,
//! round-robin, parents them under the root and hands them back once they
//! scroll past the despawn line. The player fires shots from its own pool;
//! shots that hit an obstacle send both back to their pools.
//!
//! Everything runs on the fixed tick driven by `main.rs`; there is no
//! rendering, audio or input.

use std::sync::Arc;

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use bevy_ecs::world::EntityWorldMut;
use glam::Vec2;
use log::{info, warn};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::components::inactive::Inactive;
use crate::components::rectanglecollider::RectangleCollider;
use crate::components::rigidbody::RigidBody;
use crate::components::transform2d::Transform2D;
use crate::events::collision::{CollisionEvent, ContactKind};
use crate::hierarchy::{self, HierarchyError};
use crate::pool::{GameObjectPool, PoolError, Prefab};
use crate::resources::activecontacts::ActiveContacts;
use crate::resources::gameconfig::GameConfig;
use crate::resources::prefabstore::PrefabStore;
use crate::resources::worldtime::WorldTime;
use crate::systems::collision::collision_detector;
use crate::systems::movement::movement;

pub const OBSTACLE_LAYER: &str = "Obstacle";
pub const PLAYER_LAYER: &str = "Player";
pub const SHOT_LAYER: &str = "Shot";

/// Names of the obstacle prefabs, in factory round-robin order.
pub const OBSTACLE_PREFABS: [&str; 3] = ["tree", "bush", "rock"];
pub const SHOT_PREFAB: &str = "shot";

const SCROLL_SPEED: f32 = 120.0;
const SPAWN_Y: f32 = -240.0;
const DESPAWN_Y: f32 = 320.0;
const LANE_HALF_WIDTH: f32 = 160.0;
const PLAYER_Y: f32 = 200.0;
const PLAYER_SPEED: f32 = 90.0;
const SHOT_SPEED: f32 = 420.0;
const SPAWN_EVERY_TICKS: u64 = 30;
const SHOOT_EVERY_TICKS: u64 = 45;

/// Marks the scrolling root every obstacle hangs from.
#[derive(Component, Debug, Clone, Copy)]
pub struct WorldRoot;

#[derive(Component, Debug, Clone, Copy)]
pub struct Player;

#[derive(Component, Debug, Clone, Copy)]
pub struct Obstacle;

/// Flattened shadow drawn under an obstacle.
#[derive(Component, Debug, Clone, Copy)]
pub struct Shadow;

#[derive(Component, Debug, Clone, Copy)]
pub struct Shot;

/// Obstacle recipe: a trigger collider whose pivot sits at the base of the
/// sprite, plus a shadow child object.
#[derive(Debug, Clone)]
pub struct ObstaclePrefab {
    pub name: &'static str,
    pub size: Vec2,
    pub offset: Vec2,
}

impl Prefab for ObstaclePrefab {
    fn name(&self) -> &str {
        self.name
    }

    fn configure(&self, entity: &mut EntityWorldMut) {
        let root = entity.id();
        entity.insert((
            Obstacle,
            RectangleCollider::new(self.size.x, self.size.y)
                .with_offset(self.offset)
                .with_trigger(true)
                .with_layer(OBSTACLE_LAYER),
        ));
        entity.world_scope(|world| {
            world.spawn((
                Shadow,
                Transform2D::new(0.0, 4.0).with_scale(1.0, 0.3),
                ChildOf(root),
            ));
        });
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShotPrefab;

impl Prefab for ShotPrefab {
    fn name(&self) -> &str {
        SHOT_PREFAB
    }

    fn configure(&self, entity: &mut EntityWorldMut) {
        entity.insert((
            Shot,
            RigidBody::new(),
            RectangleCollider::new(6.0, 12.0)
                .with_trigger(true)
                .with_layer(SHOT_LAYER),
        ));
    }
}

/// Pools owned by the demo's factories.
#[derive(Resource, Debug)]
pub struct DemoPools {
    pub obstacles: Vec<GameObjectPool>,
    pub shots: GameObjectPool,
    next_obstacle: usize,
}

impl DemoPools {
    fn owner_mut(&mut self, entity: Entity) -> Option<&mut GameObjectPool> {
        if self.shots.owns(entity) {
            return Some(&mut self.shots);
        }
        self.obstacles.iter_mut().find(|pool| pool.owns(entity))
    }
}

/// Counters reported at the end of the run.
#[derive(Resource, Debug, Clone, Default)]
pub struct DemoStats {
    pub spawns: u32,
    pub returns: u32,
    pub shots_fired: u32,
    pub exhausted: u32,
    pub collisions: u32,
    pub player_hits: u32,
    pub shot_hits: u32,
}

/// Instances that must go back to their pool at the end of the tick.
#[derive(Resource, Debug, Default)]
pub struct PendingReturns(FxHashSet<Entity>);

#[derive(Resource, Debug)]
pub struct SpawnRng(pub fastrand::Rng);

#[derive(Serialize, Debug, Clone)]
pub struct PoolSummary {
    pub prefab: String,
    pub capacity: usize,
    pub available: usize,
    pub in_use: usize,
}

/// End-of-run report.
#[derive(Serialize, Debug, Clone)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed: f32,
    pub spawns: u32,
    pub returns: u32,
    pub shots_fired: u32,
    pub exhausted: u32,
    pub collisions: u32,
    pub player_hits: u32,
    pub shot_hits: u32,
    pub pools: Vec<PoolSummary>,
}

/// Register the demo's prefabs by name.
pub fn register_prefabs(store: &mut PrefabStore) {
    store.insert(Arc::new(ObstaclePrefab {
        name: "tree",
        size: Vec2::new(24.0, 40.0),
        offset: Vec2::new(0.0, -20.0),
    }));
    store.insert(Arc::new(ObstaclePrefab {
        name: "bush",
        size: Vec2::new(32.0, 16.0),
        offset: Vec2::new(0.0, -8.0),
    }));
    store.insert(Arc::new(ObstaclePrefab {
        name: "rock",
        size: Vec2::new(20.0, 20.0),
        offset: Vec2::new(0.0, -10.0),
    }));
    store.insert(Arc::new(ShotPrefab));
}

/// Build the scene: resources, the world root, the player and every pool.
///
/// Reads [`GameConfig`] from the world, falling back to defaults.
pub fn setup(world: &mut World) {
    let config = world
        .get_resource::<GameConfig>()
        .cloned()
        .unwrap_or_default();

    let mut store = PrefabStore::new();
    register_prefabs(&mut store);

    world.insert_resource(config.collision_layers.clone());
    world.insert_resource(ActiveContacts::default());
    world.insert_resource(DemoStats::default());
    world.insert_resource(PendingReturns::default());
    world.insert_resource(SpawnRng(fastrand::Rng::with_seed(config.seed)));
    world.init_resource::<WorldTime>();

    world.spawn((
        WorldRoot,
        Transform2D::default(),
        RigidBody::with_velocity(Vec2::new(0.0, SCROLL_SPEED)),
    ));
    world.spawn((
        Player,
        Transform2D::new(0.0, PLAYER_Y),
        RigidBody::with_velocity(Vec2::new(PLAYER_SPEED, 0.0)),
        RectangleCollider::new(20.0, 28.0)
            .with_offset(Vec2::new(0.0, -14.0))
            .with_trigger(true)
            .with_layer(PLAYER_LAYER),
    ));

    let mut obstacles = Vec::new();
    for name in OBSTACLE_PREFABS {
        if let Some(prefab) = store.get(name) {
            obstacles.push(GameObjectPool::with_policy(
                world,
                prefab,
                config.pool_initial_size,
                config.growth,
            ));
        }
    }
    let shots = match store.get(SHOT_PREFAB) {
        Some(prefab) => {
            GameObjectPool::with_policy(world, prefab, config.shot_pool_size, config.growth)
        }
        None => GameObjectPool::with_policy(world, Arc::new(ShotPrefab), 0, config.growth),
    };
    info!(
        "Scene ready: {} obstacle pools of {}, {} shots",
        obstacles.len(),
        config.pool_initial_size,
        shots.capacity()
    );

    world.insert_resource(store);
    world.insert_resource(DemoPools {
        obstacles,
        shots,
        next_obstacle: 0,
    });
}

/// Bounce the player between the lane edges.
pub fn steer_player(mut query: Query<(&Transform2D, &mut RigidBody), With<Player>>) {
    for (transform, mut rigidbody) in query.iter_mut() {
        let x = transform.position.x;
        if (x >= LANE_HALF_WIDTH && rigidbody.velocity.x > 0.0)
            || (x <= -LANE_HALF_WIDTH && rigidbody.velocity.x < 0.0)
        {
            rigidbody.velocity.x = -rigidbody.velocity.x;
        }
    }
}

fn tick_is_due(world: &World, every: u64) -> bool {
    world
        .get_resource::<WorldTime>()
        .is_some_and(|time| time.frame_count % every == 1)
}

fn world_root(world: &mut World) -> Option<Entity> {
    let mut roots = world.query_filtered::<Entity, With<WorldRoot>>();
    roots.iter(world).next()
}

/// Obstacle factory: take the next pool in turn and drop an instance on the
/// spawn line, parented under the scrolling root.
pub fn spawn_obstacles(world: &mut World) {
    if !tick_is_due(world, SPAWN_EVERY_TICKS) {
        return;
    }
    let Some(root) = world_root(world) else {
        return;
    };
    let x = world.resource_mut::<SpawnRng>().0.f32() * 2.0 * LANE_HALF_WIDTH - LANE_HALF_WIDTH;

    let acquired = world.resource_scope(|world, mut pools: Mut<DemoPools>| {
        if pools.obstacles.is_empty() {
            return None;
        }
        let index = pools.next_obstacle % pools.obstacles.len();
        pools.next_obstacle = pools.next_obstacle.wrapping_add(1);
        Some(pools.obstacles[index].get_game_object(world))
    });

    match acquired {
        Some(Ok(entity)) => {
            if let Err(err) = place_obstacle(world, entity, root, Vec2::new(x, SPAWN_Y)) {
                warn!("Could not place obstacle {entity}: {err}");
            }
            world.resource_mut::<DemoStats>().spawns += 1;
        }
        Some(Err(PoolError::Exhausted { .. })) => {
            world.resource_mut::<DemoStats>().exhausted += 1;
        }
        Some(Err(err)) => warn!("Obstacle factory failed: {err}"),
        None => {}
    }
}

fn place_obstacle(
    world: &mut World,
    entity: Entity,
    root: Entity,
    position: Vec2,
) -> Result<(), HierarchyError> {
    hierarchy::set_parent(world, entity, Some(root), false)?;
    hierarchy::set_world_position(world, entity, position)
}

/// Fire a shot from the player's position.
pub fn fire_shots(world: &mut World) {
    if !tick_is_due(world, SHOOT_EVERY_TICKS) {
        return;
    }
    let mut players = world.query_filtered::<Entity, With<Player>>();
    let Some(player) = players.iter(world).next() else {
        return;
    };
    let Ok(origin) = hierarchy::world_position(world, player) else {
        return;
    };

    let acquired =
        world.resource_scope(|world, mut pools: Mut<DemoPools>| pools.shots.get_game_object(world));
    match acquired {
        Ok(shot) => {
            if let Some(mut transform) = world.get_mut::<Transform2D>(shot) {
                transform.set_position(origin - Vec2::new(0.0, 28.0));
            }
            if let Some(mut rigidbody) = world.get_mut::<RigidBody>(shot) {
                rigidbody.velocity = Vec2::new(0.0, -SHOT_SPEED);
                rigidbody.unfreeze();
            }
            world.resource_mut::<DemoStats>().shots_fired += 1;
        }
        Err(PoolError::Exhausted { .. }) => world.resource_mut::<DemoStats>().exhausted += 1,
        Err(err) => warn!("Shot pool failed: {err}"),
    }
}

/// Hand back obstacles past the despawn line, shots past the spawn line, and
/// everything flagged by collisions this tick.
pub fn recycle_offscreen(world: &mut World) {
    let mut expired = std::mem::take(&mut world.resource_mut::<PendingReturns>().0);

    let mut obstacles = world.query_filtered::<Entity, (With<Obstacle>, Without<Inactive>)>();
    let live: Vec<Entity> = obstacles.iter(world).collect();
    for entity in live {
        if hierarchy::world_position(world, entity).is_ok_and(|p| p.y > DESPAWN_Y) {
            expired.insert(entity);
        }
    }
    let mut shots = world.query_filtered::<(Entity, &Transform2D), (With<Shot>, Without<Inactive>)>();
    expired.extend(
        shots
            .iter(world)
            .filter(|(_, transform)| transform.position.y < SPAWN_Y)
            .map(|(entity, _)| entity),
    );

    let mut expired: Vec<Entity> = expired.into_iter().collect();
    expired.sort_unstable();
    let returned = world.resource_scope(|world, mut pools: Mut<DemoPools>| {
        let mut returned = 0;
        for entity in expired {
            let Some(pool) = pools.owner_mut(entity) else {
                continue;
            };
            if pool.is_available(entity) {
                continue;
            }
            if let Err(err) = hierarchy::set_parent(world, entity, None, false) {
                warn!("Could not detach {entity}: {err}");
            }
            match pool.return_game_object(world, entity) {
                Ok(()) => returned += 1,
                Err(err) => warn!("Could not recycle {entity}: {err}"),
            }
        }
        returned
    });
    world.resource_mut::<DemoStats>().returns += returned;
}

/// Count contacts and flag shot/obstacle hits for recycling.
pub fn observe_demo_collision(
    trigger: On<CollisionEvent>,
    players: Query<(), With<Player>>,
    shots: Query<(), With<Shot>>,
    obstacles: Query<(), With<Obstacle>>,
    mut stats: ResMut<DemoStats>,
    mut pending: ResMut<PendingReturns>,
) {
    let event = trigger.event();
    if event.kind != ContactKind::Enter {
        return;
    }
    stats.collisions += 1;

    for (this, other) in [(event.a, event.b), (event.b, event.a)] {
        if players.contains(this) && obstacles.contains(other) {
            stats.player_hits += 1;
        }
        if shots.contains(this) && obstacles.contains(other) {
            stats.shot_hits += 1;
            pending.0.insert(this);
            pending.0.insert(other);
        }
    }
}

/// Per-tick schedule for the demo scene.
pub fn build_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(steer_player);
    update.add_systems(movement.after(steer_player));
    update.add_systems(spawn_obstacles.after(movement));
    update.add_systems(fire_shots.after(spawn_obstacles));
    update.add_systems(collision_detector.after(fire_shots));
    update.add_systems(recycle_offscreen.after(collision_detector));
    update
}

/// Collect the end-of-run report.
pub fn summary(world: &World) -> RunSummary {
    let stats = world
        .get_resource::<DemoStats>()
        .cloned()
        .unwrap_or_default();
    let (ticks, elapsed) = world
        .get_resource::<WorldTime>()
        .map(|time| (time.frame_count, time.elapsed))
        .unwrap_or_default();
    let pools = world
        .get_resource::<DemoPools>()
        .map(|pools| {
            pools
                .obstacles
                .iter()
                .chain(std::iter::once(&pools.shots))
                .map(|pool| PoolSummary {
                    prefab: pool.prefab().name().to_string(),
                    capacity: pool.capacity(),
                    available: pool.available_count(),
                    in_use: pool.in_use_count(),
                })
                .collect()
        })
        .unwrap_or_default();

    RunSummary {
        ticks,
        elapsed,
        spawns: stats.spawns,
        returns: stats.returns,
        shots_fired: stats.shots_fired,
        exhausted: stats.exhausted,
        collisions: stats.collisions,
        player_hits: stats.player_hits,
        shot_hits: stats.shot_hits,
        pools,
    }
}

/// Tear the scene down, destroying every pooled instance.
pub fn teardown(world: &mut World) {
    if let Some(pools) = world.remove_resource::<DemoPools>() {
        for pool in pools.obstacles {
            pool.destroy(world);
        }
        pools.shots.destroy(world);
    }
    if let Some(mut contacts) = world.get_resource_mut::<ActiveContacts>() {
        contacts.clear();
    }
}
