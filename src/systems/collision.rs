//! Collision detection between rectangle colliders.
//!
//! [`collision_detector`] samples every collider that is active in the
//! hierarchy, refreshing its cached geometry through
//! [`TransformHierarchy`], then tests every pair on compatible layers: an
//! axis-aligned broad phase first, then a separating-axis test on the cached
//! corners and normals. The resulting overlap set is diffed against
//! [`ActiveContacts`] to trigger [`CollisionEvent`]s.
//!
//! # Schedule position
//!
//! Should run **after** every system that writes transforms in the tick, so
//! the geometry it reads reflects them. Collider caches revalidate against
//! the current transform on each read, so writes made later in the same tick
//! show up in the next pass.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::warn;
use rustc_hash::FxHashMap;

use crate::components::rectanglecollider::{RectangleCollider, aabb_of, rectangles_overlap};
use crate::events::collision::{CollisionEvent, ContactKind};
use crate::hierarchy::TransformHierarchy;
use crate::resources::activecontacts::{ActiveContacts, contact_key};
use crate::resources::collisionlayers::CollisionLayers;

struct ColliderSample {
    entity: Entity,
    layer: &'static str,
    trigger: bool,
    corners: [Vec2; 4],
    normals: [Vec2; 4],
    min: Vec2,
    max: Vec2,
}

impl ColliderSample {
    fn bounds_overlap(&self, other: &ColliderSample) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Detect overlapping colliders and trigger enter/exit events.
pub fn collision_detector(
    mut colliders: Query<(Entity, &mut RectangleCollider)>,
    hierarchy: TransformHierarchy,
    layers: Option<Res<CollisionLayers>>,
    mut contacts: ResMut<ActiveContacts>,
    mut commands: Commands,
) {
    let mut samples = Vec::new();
    for (entity, mut collider) in colliders.iter_mut() {
        if !hierarchy.is_active_in_hierarchy(entity) {
            continue;
        }
        let world = match hierarchy.world_transform(entity) {
            Ok(world) => world,
            Err(err) => {
                warn!("Skipping collider on {entity}: {err}");
                continue;
            }
        };
        // Refreshing the geometry cache is not a gameplay change.
        let collider = collider.bypass_change_detection();
        let corners = collider.world_corners(&world);
        let normals = collider.outer_normals(&world);
        let (min, max) = aabb_of(&corners);
        samples.push(ColliderSample {
            entity,
            layer: collider.collision_layer,
            trigger: collider.is_trigger,
            corners,
            normals,
            min,
            max,
        });
    }

    let mut current: FxHashMap<(Entity, Entity), bool> = FxHashMap::default();
    for (i, a) in samples.iter().enumerate() {
        for b in &samples[i + 1..] {
            if layers
                .as_deref()
                .is_some_and(|layers| !layers.can_collide(a.layer, b.layer))
            {
                continue;
            }
            if !a.bounds_overlap(b) {
                continue;
            }
            if rectangles_overlap(&a.corners, &a.normals, &b.corners, &b.normals) {
                current.insert(contact_key(a.entity, b.entity), a.trigger || b.trigger);
            }
        }
    }

    let exits: Vec<_> = contacts
        .sorted_pairs()
        .into_iter()
        .filter(|key| !current.contains_key(key))
        .collect();
    let mut enters: Vec<_> = current
        .iter()
        .filter(|(key, _)| !contacts.contains(key.0, key.1))
        .map(|(key, trigger)| (*key, *trigger))
        .collect();
    enters.sort_unstable_by_key(|(key, _)| *key);

    let previous = contacts.replace(current);
    for (a, b) in exits {
        let trigger = previous.get(&(a, b)).copied().unwrap_or(false);
        commands.trigger(CollisionEvent {
            a,
            b,
            kind: ContactKind::Exit,
            trigger,
        });
    }
    for ((a, b), trigger) in enters {
        commands.trigger(CollisionEvent {
            a,
            b,
            kind: ContactKind::Enter,
            trigger,
        });
    }
}
