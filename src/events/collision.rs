//! Collision event types and a logging observer.
//!
//! The [`collision_detector`](crate::systems::collision::collision_detector)
//! system triggers a [`CollisionEvent`] when two colliders on compatible
//! layers start overlapping ([`ContactKind::Enter`]) and again when they stop
//! ([`ContactKind::Exit`]). Gameplay code subscribes with observers and reacts
//! in a decoupled manner (damage, despawn, returning an object to its pool).
//!
//! There is no collision response; events only report overlap.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

/// Whether a contact started or ended this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Enter,
    Exit,
}

/// Event fired when two colliders start or stop overlapping.
///
/// `a` always orders before `b`. On [`ContactKind::Exit`] either entity may
/// already be despawned or inactive, since losing a participant also ends the
/// contact.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: Entity,
    pub b: Entity,
    pub kind: ContactKind,
    /// True when at least one of the colliders is a trigger.
    pub trigger: bool,
}

impl CollisionEvent {
    pub fn involves(&self, entity: Entity) -> bool {
        self.a == entity || self.b == entity
    }

    /// The participant that is not `entity`, if `entity` takes part.
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.a == entity {
            Some(self.b)
        } else if self.b == entity {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Global observer that logs every collision event at debug level.
pub fn observe_log_collision(trigger: On<CollisionEvent>) {
    let event = trigger.event();
    debug!(
        "Collision {:?} between {} and {} (trigger: {})",
        event.kind, event.a, event.b, event.trigger
    );
}
