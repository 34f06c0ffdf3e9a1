//! World-space transform values and the 2D math used to compose them.
//!
//! A [`GlobalTransform2D`] is the result of composing every
//! [`Transform2D`] from the root of a hierarchy down to one entity. It is a
//! plain value: nothing stores it on the entity, it is recomputed on every
//! query (see [`crate::hierarchy`]).
//!
//! Composition for a child with local transform `l` under a parent with world
//! transform `p`:
//!
//! - scale: `p.scale * l.scale` (component-wise)
//! - rotation: `wrap(p.rotation + l.rotation)` into `[0, 360)`
//! - position: `p.position + rotate(l.position * p.scale, p.rotation)`
//!
//! Coordinates follow screen conventions (+y down), so a positive angle turns
//! +x toward +y, which reads as clockwise on screen.

use glam::Vec2;

use super::transform2d::Transform2D;

/// Rotate a 2D vector by `angle_degrees`.
pub fn rotate(v: Vec2, angle_degrees: f32) -> Vec2 {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    Vec2 {
        x: v.x * cos - v.y * sin,
        y: v.x * sin + v.y * cos,
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Composed world-space transform of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalTransform2D {
    /// World-space position.
    pub position: Vec2,
    /// World-space rotation in degrees, in `[0, 360)`.
    pub rotation_degrees: f32,
    /// World-space scale.
    pub scale: Vec2,
}

impl Default for GlobalTransform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl GlobalTransform2D {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation_degrees: 0.0,
        scale: Vec2::ONE,
    };

    /// World transform of a root entity (no parent).
    pub fn from_local(local: &Transform2D) -> Self {
        Self::IDENTITY.compose(local)
    }

    /// World transform of a child with `local` placed under `self`.
    pub fn compose(&self, local: &Transform2D) -> Self {
        let offset = rotate(local.position * self.scale, self.rotation_degrees);
        Self {
            position: self.position + offset,
            rotation_degrees: wrap_degrees(self.rotation_degrees + local.rotation_degrees),
            scale: self.scale * local.scale,
        }
    }

    /// The local transform that, composed under `parent`, reproduces `self`.
    ///
    /// Returns `None` when a component of the parent's scale is zero, since
    /// the composition cannot be inverted.
    pub fn local_relative_to(&self, parent: &GlobalTransform2D) -> Option<Transform2D> {
        if parent.scale.x == 0.0 || parent.scale.y == 0.0 {
            return None;
        }
        let unrotated = rotate(self.position - parent.position, -parent.rotation_degrees);
        Some(Transform2D {
            position: unrotated / parent.scale,
            rotation_degrees: wrap_degrees(self.rotation_degrees - parent.rotation_degrees),
            scale: self.scale / parent.scale,
        })
    }

    /// Map a point from this entity's local space into world space.
    pub fn transform_point(&self, local_point: Vec2) -> Vec2 {
        self.position + rotate(local_point * self.scale, self.rotation_degrees)
    }
}
