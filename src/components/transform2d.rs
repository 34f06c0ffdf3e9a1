//! Local transform of a game object.
//!
//! [`Transform2D`] holds position, rotation, and scale relative to the
//! entity's parent (the target of its [`ChildOf`](bevy_ecs::hierarchy::ChildOf)
//! relationship). Root entities interpret these values directly as world space.
//!
//! World-space values are never stored here. They are composed on demand by
//! [`crate::hierarchy::world_transform`] or the
//! [`TransformHierarchy`](crate::hierarchy::TransformHierarchy) system parameter,
//! so writing a local value is immediately visible to every later query in the
//! same tick, for this entity and all of its descendants.

use bevy_ecs::prelude::Component;
use glam::Vec2;

use super::globaltransform2d::wrap_degrees;

/// Position, rotation (degrees), and scale relative to the parent.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    /// Offset from the parent's pivot, in parent-local units.
    pub position: Vec2,
    /// Rotation in degrees, kept in `[0, 360)` by the setters.
    pub rotation_degrees: f32,
    /// Component-wise scale applied to this entity and inherited by children.
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation_degrees: 0.0,
        scale: Vec2::ONE,
    };

    /// Create a transform at the given local position.
    pub fn new(x: f32, y: f32) -> Self {
        Self::from_position(Vec2::new(x, y))
    }

    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.set_rotation(degrees);
        self
    }

    pub fn with_scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale = Vec2::new(sx, sy);
        self
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Set the local rotation, wrapped into `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation_degrees = wrap_degrees(degrees);
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// Move by `delta` in parent-local units.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Add `degrees` to the local rotation.
    pub fn rotate_by(&mut self, degrees: f32) {
        self.set_rotation(self.rotation_degrees + degrees);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let t = Transform2D::default();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.rotation_degrees, 0.0);
        assert_eq!(t.scale, Vec2::ONE);
    }

    #[test]
    fn rotation_setters_wrap() {
        let mut t = Transform2D::new(1.0, 2.0).with_rotation(370.0);
        assert_eq!(t.rotation_degrees, 10.0);
        t.rotate_by(-20.0);
        assert_eq!(t.rotation_degrees, 350.0);
    }

    #[test]
    fn translate_accumulates() {
        let mut t = Transform2D::new(10.0, 0.0);
        t.translate(Vec2::new(5.0, -3.0));
        t.translate(Vec2::new(5.0, -3.0));
        assert_eq!(t.position, Vec2::new(20.0, -6.0));
    }
}
