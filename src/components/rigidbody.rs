//! Kinematic body component.
//!
//! The [`RigidBody`] component stores a velocity in parent-local units per
//! second. The [`movement`](crate::systems::movement::movement) system
//! integrates it into the entity's [`Transform2D`](super::transform2d::Transform2D).
//!
//! There is no collision response: bodies pass through each other and only
//! collision events are reported.

use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Kinematic body storing a velocity.
///
/// The `frozen` flag skips integration for the entity, useful when gameplay
/// code drives its position directly for a while.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct RigidBody {
    /// Current velocity in parent-local units per second.
    pub velocity: Vec2,
    /// When true, the movement system leaves the entity alone.
    pub frozen: bool,
}

impl RigidBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(velocity: Vec2) -> Self {
        Self {
            velocity,
            frozen: false,
        }
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }
}
