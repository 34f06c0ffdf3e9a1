use bevy_ecs::prelude::*;

use crate::components::rigidbody::RigidBody;
use crate::components::transform2d::Transform2D;
use crate::hierarchy::HierarchyActivity;
use crate::resources::worldtime::WorldTime;

/// Integrate rigid body velocities into local positions.
///
/// Frozen bodies are skipped, and so is any body that is inactive in the
/// hierarchy (its own [`Inactive`](crate::components::inactive::Inactive)
/// marker or one on an ancestor). Only the local transform is written; world
/// positions of descendants follow on their next query.
pub fn movement(
    mut query: Query<(Entity, &mut Transform2D, &RigidBody)>,
    activity: HierarchyActivity,
    time: Res<WorldTime>,
) {
    for (entity, mut transform, rigidbody) in query.iter_mut() {
        if rigidbody.frozen || !activity.is_active_in_hierarchy(entity) {
            continue;
        }
        transform.translate(rigidbody.velocity * time.delta);
    }
}
