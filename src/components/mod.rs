//! ECS components for entities.
//!
//! This module groups all component types that can be attached to entities in
//! the game world. Components define data such as local transforms, collider
//! shapes, velocities, and activation state.
//!
//! Submodules overview:
//! - [`globaltransform2d`] – composed world-space transform and rotation helpers
//! - [`inactive`] – marker for deactivated (e.g. pooled) objects
//! - [`rectanglecollider`] – oriented rectangle collider with cached world geometry
//! - [`rigidbody`] – simple kinematic body storing velocity
//! - [`transform2d`] – local position, rotation, and scale relative to the parent

pub mod globaltransform2d;
pub mod inactive;
pub mod rectanglecollider;
pub mod rigidbody;
pub mod transform2d;
