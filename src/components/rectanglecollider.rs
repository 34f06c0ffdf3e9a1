//! Oriented rectangle collider.
//!
//! A [`RectangleCollider`] describes a rectangle in its entity's local space
//! (a size plus a pivot offset) and derives world-space geometry from the
//! entity's [`GlobalTransform2D`]: four corners and four outward unit normals.
//!
//! # Geometry cache
//!
//! Corners and normals are cached together with the world transform they were
//! derived from. Every query first calls
//! [`check_cache_validity`](RectangleCollider::check_cache_validity), which
//! compares that snapshot against the current world transform and, on any
//! difference, drops corners and normals together. A query then recomputes
//! whatever is missing. Changing `size` or `offset` through the setters drops
//! the cache as well.
//!
//! # Winding and normals
//!
//! Corners are enumerated top-left, top-right, bottom-right, bottom-left in
//! local space, which is clockwise on screen (+y down). For an edge
//! `e = c[i + 1] - c[i]` the outward normal is `(e.y, -e.x)`, normalized.
//! Half extents use the absolute world-scaled size, so a mirrored (negative)
//! scale never reverses the winding and the normals stay outward.

use bevy_ecs::prelude::Component;
use glam::Vec2;

use super::globaltransform2d::{GlobalTransform2D, rotate};
use super::transform2d::Transform2D;

/// Layer assigned to colliders that do not pick one.
pub const DEFAULT_COLLISION_LAYER: &str = "Default";

#[derive(Debug, Clone, Default, PartialEq)]
struct GeometryCache {
    snapshot: Option<GlobalTransform2D>,
    corners: Option<[Vec2; 4]>,
    normals: Option<[Vec2; 4]>,
}

/// Rectangle collider attached to an entity with a [`Transform2D`].
#[derive(Component, Debug, Clone)]
pub struct RectangleCollider {
    size: Vec2,
    offset: Vec2,
    /// Report overlaps as trigger events.
    pub is_trigger: bool,
    /// Tag matched against [`CollisionLayers`](crate::resources::collisionlayers::CollisionLayers).
    pub collision_layer: &'static str,
    cache: GeometryCache,
}

impl RectangleCollider {
    /// Create a collider with given size, centered on the entity pivot.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            offset: Vec2::ZERO,
            is_trigger: false,
            collision_layer: DEFAULT_COLLISION_LAYER,
            cache: GeometryCache::default(),
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.set_offset(offset);
        self
    }

    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    pub fn with_layer(mut self, layer: &'static str) -> Self {
        self.collision_layer = layer;
        self
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.invalidate();
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.invalidate();
    }

    /// Size scaled by the entity's local scale only.
    pub fn local_scaled_size(&self, local: &Transform2D) -> Vec2 {
        self.size * local.scale
    }

    /// Size scaled by the entity's world scale.
    pub fn world_scaled_size(&self, world: &GlobalTransform2D) -> Vec2 {
        self.size * world.scale
    }

    /// Pivot offset scaled by the entity's world scale (not yet rotated).
    pub fn world_scaled_offset(&self, world: &GlobalTransform2D) -> Vec2 {
        self.offset * world.scale
    }

    /// Compare the cached transform snapshot with `world`.
    ///
    /// Returns `true` if the cache still matches. Otherwise stores `world` as
    /// the new snapshot, drops corners and normals, and returns `false`.
    pub fn check_cache_validity(&mut self, world: &GlobalTransform2D) -> bool {
        if self.cache.snapshot.as_ref() == Some(world) {
            return true;
        }
        self.cache = GeometryCache {
            snapshot: Some(*world),
            corners: None,
            normals: None,
        };
        false
    }

    /// Drop the snapshot, corners, and normals.
    pub fn invalidate(&mut self) {
        self.cache = GeometryCache::default();
    }

    pub fn has_cached_geometry(&self) -> bool {
        self.cache.corners.is_some()
    }

    /// World-space corners: top-left, top-right, bottom-right, bottom-left.
    pub fn world_corners(&mut self, world: &GlobalTransform2D) -> [Vec2; 4] {
        self.check_cache_validity(world);
        if let Some(corners) = self.cache.corners {
            return corners;
        }

        let half = self.world_scaled_size(world).abs() / 2.0;
        let center =
            world.position + rotate(self.world_scaled_offset(world), world.rotation_degrees);
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ]
        .map(|corner| center + rotate(corner, world.rotation_degrees));

        self.cache.corners = Some(corners);
        corners
    }

    /// Outward unit normal of each edge `corner[i] -> corner[(i + 1) % 4]`.
    pub fn outer_normals(&mut self, world: &GlobalTransform2D) -> [Vec2; 4] {
        self.check_cache_validity(world);
        if let Some(normals) = self.cache.normals {
            return normals;
        }

        let corners = self.world_corners(world);
        let normals = std::array::from_fn(|i| {
            let edge = corners[(i + 1) % 4] - corners[i];
            Vec2::new(edge.y, -edge.x).normalize_or_zero()
        });

        self.cache.normals = Some(normals);
        normals
    }

    /// World-space axis-aligned bounds `(min, max)` of the rotated rectangle.
    pub fn world_aabb(&mut self, world: &GlobalTransform2D) -> (Vec2, Vec2) {
        aabb_of(&self.world_corners(world))
    }

    /// Point containment in world space. Points on an edge are inside.
    ///
    /// A rectangle with no world area contains nothing.
    pub fn contains_point(&mut self, world: &GlobalTransform2D, point: Vec2) -> bool {
        if self.world_scaled_size(world).cmpeq(Vec2::ZERO).any() {
            return false;
        }
        let corners = self.world_corners(world);
        let normals = self.outer_normals(world);
        corners
            .iter()
            .zip(normals.iter())
            .all(|(corner, normal)| normal.dot(point - *corner) <= 0.0)
    }

    /// Separating-axis overlap test against another collider.
    pub fn overlaps(
        &mut self,
        world: &GlobalTransform2D,
        other: &mut RectangleCollider,
        other_world: &GlobalTransform2D,
    ) -> bool {
        let corners = self.world_corners(world);
        let normals = self.outer_normals(world);
        let other_corners = other.world_corners(other_world);
        let other_normals = other.outer_normals(other_world);
        rectangles_overlap(&corners, &normals, &other_corners, &other_normals)
    }
}

/// Axis-aligned bounds `(min, max)` of a set of corners.
pub fn aabb_of(corners: &[Vec2; 4]) -> (Vec2, Vec2) {
    let min = corners.iter().copied().fold(Vec2::splat(f32::INFINITY), Vec2::min);
    let max = corners.iter().copied().fold(Vec2::splat(f32::NEG_INFINITY), Vec2::max);
    (min, max)
}

/// Separating-axis test between two convex quads given their outward normals.
///
/// Intervals that only touch do not count as overlapping. A quad with a
/// zero-length edge has a zero normal, every projection onto it collapses to
/// a point, and so a degenerate rectangle never overlaps anything.
pub fn rectangles_overlap(
    a_corners: &[Vec2; 4],
    a_normals: &[Vec2; 4],
    b_corners: &[Vec2; 4],
    b_normals: &[Vec2; 4],
) -> bool {
    a_normals.iter().chain(b_normals.iter()).all(|axis| {
        let (a_min, a_max) = project(a_corners, *axis);
        let (b_min, b_max) = project(b_corners, *axis);
        a_min < b_max && b_min < a_max
    })
}

fn project(corners: &[Vec2; 4], axis: Vec2) -> (f32, f32) {
    corners
        .iter()
        .map(|corner| corner.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), d| {
            (min.min(d), max.max(d))
        })
}
