//! Prefabs and game object pools.
//!
//! A [`Prefab`] is an immutable recipe that turns a freshly spawned entity
//! into a complete game object (components, child objects). A
//! [`GameObjectPool`] builds instances from one prefab up front and recycles
//! them: gameplay code takes an instance with
//! [`get_game_object`](GameObjectPool::get_game_object) and gives it back with
//! [`return_game_object`](GameObjectPool::return_game_object) instead of
//! spawning and despawning.
//!
//! # Contract
//!
//! - Every instance the pool owns is either available (parked with the
//!   [`Inactive`] marker) or in use. The pool never hands out an in-use one.
//! - Available instances are handed out last-in first-out: the most recently
//!   returned (or most recently built) instance goes first.
//! - Returning an instance only deactivates it. Position, parent, velocity and
//!   other gameplay state are left as they were; whoever takes it next
//!   re-initializes it.
//! - When nothing is available, [`GrowthPolicy`] decides between building a
//!   new instance and failing with [`PoolError::Exhausted`].
//! - Misuse (returning a foreign entity or returning twice) is reported and
//!   leaves the pool unchanged.

use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use bevy_ecs::world::EntityWorldMut;
use log::{debug, warn};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::inactive::Inactive;
use crate::components::transform2d::Transform2D;

/// Recipe for building a game object.
///
/// `configure` receives a new root entity that already has a default
/// [`Transform2D`]. It may insert components and spawn child objects (use
/// [`EntityWorldMut::world_scope`] and a [`ChildOf`](bevy_ecs::hierarchy::ChildOf)
/// pointing at the root).
pub trait Prefab: Send + Sync {
    fn name(&self) -> &str;
    fn configure(&self, entity: &mut EntityWorldMut);
}

impl fmt::Debug for dyn Prefab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefab").field("name", &self.name()).finish()
    }
}

/// Spawn one active game object from `prefab`.
pub fn instantiate(world: &mut World, prefab: &dyn Prefab) -> Entity {
    let mut entity = world.spawn(Transform2D::default());
    prefab.configure(&mut entity);
    entity.id()
}

/// What a pool does when asked for an instance while none is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Never build past the initial size; report exhaustion instead.
    Fixed,
    /// Build a new instance on demand, up to `limit` instances in total.
    Grow { limit: Option<usize> },
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy::Grow { limit: None }
    }
}

/// Errors reported by [`GameObjectPool`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("pool for '{prefab}' is exhausted ({capacity} instance(s), all in use)")]
    Exhausted { prefab: String, capacity: usize },
    #[error("entity {0} was not built by this pool")]
    NotOwned(Entity),
    #[error("entity {0} is already available in the pool")]
    AlreadyAvailable(Entity),
    #[error("pooled entity {0} was despawned outside the pool")]
    InstanceDespawned(Entity),
}

/// A set of pre-built game objects recycled from one prefab.
pub struct GameObjectPool {
    prefab: Arc<dyn Prefab>,
    policy: GrowthPolicy,
    instances: FxHashSet<Entity>,
    available: Vec<Entity>,
}

impl GameObjectPool {
    /// Build `initial_size` inactive instances with the default growth policy.
    pub fn new(world: &mut World, prefab: Arc<dyn Prefab>, initial_size: usize) -> Self {
        Self::with_policy(world, prefab, initial_size, GrowthPolicy::default())
    }

    /// Build `initial_size` inactive instances with an explicit growth policy.
    pub fn with_policy(
        world: &mut World,
        prefab: Arc<dyn Prefab>,
        initial_size: usize,
        policy: GrowthPolicy,
    ) -> Self {
        let mut pool = Self {
            prefab,
            policy,
            instances: FxHashSet::default(),
            available: Vec::with_capacity(initial_size),
        };
        for _ in 0..initial_size {
            let entity = pool.build_instance(world);
            pool.available.push(entity);
        }
        debug!(
            "Created pool for '{}' with {} instance(s), policy {:?}",
            pool.prefab.name(),
            initial_size,
            policy
        );
        pool
    }

    fn build_instance(&mut self, world: &mut World) -> Entity {
        let entity = instantiate(world, self.prefab.as_ref());
        world.entity_mut(entity).insert(Inactive);
        self.instances.insert(entity);
        entity
    }

    fn can_grow(&self) -> bool {
        match self.policy {
            GrowthPolicy::Fixed => false,
            GrowthPolicy::Grow { limit } => limit.is_none_or(|limit| self.instances.len() < limit),
        }
    }

    /// Hand out an available instance and activate it.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when nothing is available and the growth
    /// policy forbids building another instance.
    pub fn get_game_object(&mut self, world: &mut World) -> Result<Entity, PoolError> {
        while let Some(entity) = self.available.pop() {
            if world.get_entity(entity).is_err() {
                warn!(
                    "Pooled '{}' instance {entity} was despawned while parked; dropping it",
                    self.prefab.name()
                );
                self.instances.remove(&entity);
                continue;
            }
            world.entity_mut(entity).remove::<Inactive>();
            return Ok(entity);
        }

        if !self.can_grow() {
            warn!(
                "Pool for '{}' exhausted: {} instance(s) in use",
                self.prefab.name(),
                self.instances.len()
            );
            return Err(PoolError::Exhausted {
                prefab: self.prefab.name().to_string(),
                capacity: self.instances.len(),
            });
        }

        let entity = self.build_instance(world);
        world.entity_mut(entity).remove::<Inactive>();
        debug!(
            "Pool for '{}' grew to {} instance(s)",
            self.prefab.name(),
            self.instances.len()
        );
        Ok(entity)
    }

    /// Take back an in-use instance and deactivate it.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotOwned`] if this pool did not build `entity`.
    /// - [`PoolError::AlreadyAvailable`] if it was already returned.
    /// - [`PoolError::InstanceDespawned`] if it no longer exists; the pool
    ///   forgets it.
    pub fn return_game_object(&mut self, world: &mut World, entity: Entity) -> Result<(), PoolError> {
        if !self.instances.contains(&entity) {
            warn!(
                "Entity {entity} returned to pool '{}' which does not own it",
                self.prefab.name()
            );
            return Err(PoolError::NotOwned(entity));
        }
        if self.available.contains(&entity) {
            warn!(
                "Entity {entity} returned twice to pool '{}'",
                self.prefab.name()
            );
            return Err(PoolError::AlreadyAvailable(entity));
        }
        if world.get_entity(entity).is_err() {
            self.instances.remove(&entity);
            return Err(PoolError::InstanceDespawned(entity));
        }

        world.entity_mut(entity).insert(Inactive);
        self.available.push(entity);
        Ok(())
    }

    /// Despawn every instance the pool still owns, in use or not.
    pub fn destroy(self, world: &mut World) {
        let mut despawned = 0;
        for entity in self.instances {
            // an earlier despawn may already have taken this one as a descendant
            if world.get_entity(entity).is_ok() {
                world.entity_mut(entity).despawn();
                despawned += 1;
            }
        }
        debug!(
            "Destroyed pool for '{}' ({despawned} instance(s))",
            self.prefab.name()
        );
    }

    pub fn prefab(&self) -> &Arc<dyn Prefab> {
        &self.prefab
    }

    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Number of instances built and still owned.
    pub fn capacity(&self) -> usize {
        self.instances.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn in_use_count(&self) -> usize {
        self.instances.len() - self.available.len()
    }

    pub fn owns(&self, entity: Entity) -> bool {
        self.instances.contains(&entity)
    }

    pub fn is_available(&self, entity: Entity) -> bool {
        self.available.contains(&entity)
    }
}

impl fmt::Debug for GameObjectPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObjectPool")
            .field("prefab", &self.prefab.name())
            .field("policy", &self.policy)
            .field("capacity", &self.capacity())
            .field("available", &self.available_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::rigidbody::RigidBody;

    struct Marker;

    impl Prefab for Marker {
        fn name(&self) -> &str {
            "Marker"
        }
        fn configure(&self, entity: &mut EntityWorldMut) {
            entity.insert(RigidBody::new());
        }
    }

    #[test]
    fn instances_start_parked() {
        let mut world = World::new();
        let pool = GameObjectPool::new(&mut world, Arc::new(Marker), 3);
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.available_count(), 3);
        assert_eq!(pool.in_use_count(), 0);
        let mut query = world.query::<(&Transform2D, &RigidBody, &Inactive)>();
        assert_eq!(query.iter(&world).count(), 3);
    }

    #[test]
    fn lifo_hands_back_the_last_return_first() {
        let mut world = World::new();
        let mut pool = GameObjectPool::new(&mut world, Arc::new(Marker), 2);
        let a = pool.get_game_object(&mut world).unwrap();
        let b = pool.get_game_object(&mut world).unwrap();
        pool.return_game_object(&mut world, a).unwrap();
        pool.return_game_object(&mut world, b).unwrap();
        assert_eq!(pool.get_game_object(&mut world).unwrap(), b);
        assert_eq!(pool.get_game_object(&mut world).unwrap(), a);
    }

    #[test]
    fn grow_limit_caps_capacity() {
        let mut world = World::new();
        let mut pool = GameObjectPool::with_policy(
            &mut world,
            Arc::new(Marker),
            1,
            GrowthPolicy::Grow { limit: Some(2) },
        );
        pool.get_game_object(&mut world).unwrap();
        pool.get_game_object(&mut world).unwrap();
        assert_eq!(pool.capacity(), 2);
        assert!(matches!(
            pool.get_game_object(&mut world),
            Err(PoolError::Exhausted { capacity: 2, .. })
        ));
    }

    #[test]
    fn growth_policy_serializes_snake_case() {
        let json = serde_json::to_string(&GrowthPolicy::Fixed).unwrap();
        assert_eq!(json, "\"fixed\"");
        let grow: GrowthPolicy = serde_json::from_str(r#"{"grow":{"limit":4}}"#).unwrap();
        assert_eq!(grow, GrowthPolicy::Grow { limit: Some(4) });
    }
}
