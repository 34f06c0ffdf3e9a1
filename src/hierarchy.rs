//! Parent/child transform hierarchy.
//!
//! Parent links are bevy's [`ChildOf`] relationship; bevy keeps the matching
//! [`Children`] list on the parent. Local values live in [`Transform2D`].
//! World values are composed lazily from the root down every time they are
//! asked for, so there is no dirty state to propagate and no frame in which a
//! world value can lag behind a local write.
//!
//! Structural changes go through [`set_parent`], which refuses to create
//! cycles. Destroying an entity with [`destroy`] takes its whole subtree with
//! it (bevy despawns `Children` along with their parent).
//!
//! Systems use the [`TransformHierarchy`] parameter for the same queries.

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemParam;
use glam::Vec2;
use log::debug;
use smallvec::SmallVec;
use thiserror::Error;

use crate::components::globaltransform2d::GlobalTransform2D;
use crate::components::inactive::Inactive;
use crate::components::transform2d::Transform2D;

/// Most nodes a root-to-leaf chain may hold, counting both ends.
///
/// [`set_parent`] refuses moves that would build a longer chain; walks that
/// meet one anyway treat the hierarchy as corrupt.
pub const MAX_HIERARCHY_DEPTH: usize = 256;

fn too_deep(nodes: usize) -> bool {
    nodes > MAX_HIERARCHY_DEPTH
}

/// Structural errors reported by hierarchy operations.
///
/// A failed operation leaves every entity untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("entity {0} does not exist")]
    EntityNotFound(Entity),
    #[error("entity {0} cannot be its own parent")]
    SelfParent(Entity),
    #[error("reparenting {child} under {parent} would create a cycle")]
    Cycle { child: Entity, parent: Entity },
    #[error("parent {0} has a zero world scale component and cannot be inverted")]
    DegenerateScale(Entity),
    #[error("parent chain above {0} is deeper than {max} levels", max = MAX_HIERARCHY_DEPTH)]
    DepthExceeded(Entity),
}

/// Compose the world transform of `entity` from a node lookup.
///
/// `lookup` returns the local transform and parent of a node, or `None` if the
/// node does not exist.
fn compose_chain<F>(entity: Entity, lookup: F) -> Result<GlobalTransform2D, HierarchyError>
where
    F: Fn(Entity) -> Option<(Transform2D, Option<Entity>)>,
{
    let mut chain: SmallVec<[Transform2D; 8]> = SmallVec::new();
    let mut current = Some(entity);
    while let Some(node) = current {
        if too_deep(chain.len() + 1) {
            return Err(HierarchyError::DepthExceeded(entity));
        }
        let (local, parent) = lookup(node).ok_or(HierarchyError::EntityNotFound(node))?;
        chain.push(local);
        current = parent;
    }

    Ok(chain
        .iter()
        .rev()
        .fold(GlobalTransform2D::IDENTITY, |parent, local| parent.compose(local)))
}

/// Walk from `entity` to its root. `lookup` returns the parent of a node and
/// whether it is [`Inactive`], or `None` if the node does not exist.
fn active_chain<F>(entity: Entity, lookup: F) -> bool
where
    F: Fn(Entity) -> Option<(Option<Entity>, bool)>,
{
    let mut current = Some(entity);
    let mut nodes = 0;
    while let Some(node) = current {
        let Some((parent, inactive)) = lookup(node) else {
            return false;
        };
        nodes += 1;
        if inactive || too_deep(nodes) {
            return false;
        }
        current = parent;
    }
    true
}

fn world_lookup(world: &World, entity: Entity) -> Option<(Transform2D, Option<Entity>)> {
    let entity_ref = world.get_entity(entity).ok()?;
    let local = entity_ref.get::<Transform2D>().copied().unwrap_or_default();
    let parent = entity_ref.get::<ChildOf>().map(ChildOf::parent);
    Some((local, parent))
}

fn ensure_exists(world: &World, entity: Entity) -> Result<(), HierarchyError> {
    world
        .get_entity(entity)
        .map(|_| ())
        .map_err(|_| HierarchyError::EntityNotFound(entity))
}

/// Parent of `entity`, if it has one.
pub fn parent_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<ChildOf>(entity).map(ChildOf::parent)
}

/// Children of `entity` in insertion order.
pub fn children_of(world: &World, entity: Entity) -> Vec<Entity> {
    world
        .get::<Children>(entity)
        .map(|children| children.to_vec())
        .unwrap_or_default()
}

/// World transform of `entity`, composed through every ancestor.
pub fn world_transform(world: &World, entity: Entity) -> Result<GlobalTransform2D, HierarchyError> {
    compose_chain(entity, |node| world_lookup(world, node))
}

pub fn world_position(world: &World, entity: Entity) -> Result<Vec2, HierarchyError> {
    world_transform(world, entity).map(|gt| gt.position)
}

pub fn world_rotation(world: &World, entity: Entity) -> Result<f32, HierarchyError> {
    world_transform(world, entity).map(|gt| gt.rotation_degrees)
}

pub fn world_scale(world: &World, entity: Entity) -> Result<Vec2, HierarchyError> {
    world_transform(world, entity).map(|gt| gt.scale)
}

/// Whether `ancestor` appears strictly above `entity` in its parent chain.
pub fn is_ancestor(world: &World, ancestor: Entity, entity: Entity) -> Result<bool, HierarchyError> {
    let mut current = parent_of(world, entity);
    let mut nodes = 1;
    while let Some(node) = current {
        if node == ancestor {
            return Ok(true);
        }
        nodes += 1;
        if too_deep(nodes) {
            return Err(HierarchyError::DepthExceeded(entity));
        }
        current = parent_of(world, node);
    }
    Ok(false)
}

/// Number of nodes from `entity` up to its root, both included.
pub fn depth_of(world: &World, entity: Entity) -> Result<usize, HierarchyError> {
    ensure_exists(world, entity)?;
    let mut current = parent_of(world, entity);
    let mut nodes = 1;
    while let Some(node) = current {
        nodes += 1;
        if too_deep(nodes) {
            return Err(HierarchyError::DepthExceeded(entity));
        }
        current = parent_of(world, node);
    }
    Ok(nodes)
}

/// Number of nodes on the longest path from `entity` down to a leaf, counting
/// `nodes` for `entity` itself. Stops descending once the count is too deep.
fn subtree_height(world: &World, entity: Entity, nodes: usize) -> usize {
    if too_deep(nodes) {
        return nodes;
    }
    children_of(world, entity)
        .into_iter()
        .map(|child| subtree_height(world, child, nodes + 1))
        .max()
        .unwrap_or(nodes)
}

/// False if `entity` is missing or it or any of its ancestors is [`Inactive`].
pub fn is_active_in_hierarchy(world: &World, entity: Entity) -> bool {
    active_chain(entity, |node| {
        let node_ref = world.get_entity(node).ok()?;
        Some((
            node_ref.get::<ChildOf>().map(ChildOf::parent),
            node_ref.contains::<Inactive>(),
        ))
    })
}

/// Reparent `child` under `new_parent`, or make it a root with `None`.
///
/// With `keep_world_transform` the child's local transform is rewritten so
/// its world transform is the same after the move. Otherwise the local values
/// are kept and the child moves along with its new parent.
///
/// # Errors
///
/// Fails without changing anything if either entity is missing, if
/// `new_parent` is `child` or one of its descendants, if the move would
/// make a chain longer than [`MAX_HIERARCHY_DEPTH`], or if the world
/// transform must be kept but the new parent's world scale has a zero
/// component.
pub fn set_parent(
    world: &mut World,
    child: Entity,
    new_parent: Option<Entity>,
    keep_world_transform: bool,
) -> Result<(), HierarchyError> {
    ensure_exists(world, child)?;

    let target = match new_parent {
        Some(parent) => {
            ensure_exists(world, parent)?;
            if parent == child {
                return Err(HierarchyError::SelfParent(child));
            }
            if is_ancestor(world, child, parent)? {
                return Err(HierarchyError::Cycle { child, parent });
            }
            if too_deep(depth_of(world, parent)? + subtree_height(world, child, 1)) {
                return Err(HierarchyError::DepthExceeded(child));
            }
            Some((parent, world_transform(world, parent)?))
        }
        None => None,
    };

    if keep_world_transform {
        let current = world_transform(world, child)?;
        let local = match target {
            Some((parent, parent_world)) => current
                .local_relative_to(&parent_world)
                .ok_or(HierarchyError::DegenerateScale(parent))?,
            None => Transform2D {
                position: current.position,
                rotation_degrees: current.rotation_degrees,
                scale: current.scale,
            },
        };
        world.entity_mut(child).insert(local);
    }

    let mut child_mut = world.entity_mut(child);
    match target {
        Some((parent, _)) => {
            child_mut.insert(ChildOf(parent));
            debug!("Reparented {child} under {parent} (keep world: {keep_world_transform})");
        }
        None => {
            child_mut.remove::<ChildOf>();
            debug!("Detached {child} to root (keep world: {keep_world_transform})");
        }
    }
    Ok(())
}

/// Move `entity` so its world position becomes `position`.
///
/// Only the local position changes; rotation and scale are left alone.
pub fn set_world_position(
    world: &mut World,
    entity: Entity,
    position: Vec2,
) -> Result<(), HierarchyError> {
    let current = world_transform(world, entity)?;
    let target = GlobalTransform2D {
        position,
        ..current
    };
    let local_position = match parent_of(world, entity) {
        Some(parent) => {
            let parent_world = world_transform(world, parent)?;
            target
                .local_relative_to(&parent_world)
                .ok_or(HierarchyError::DegenerateScale(parent))?
                .position
        }
        None => position,
    };

    if let Some(mut transform) = world.get_mut::<Transform2D>(entity) {
        transform.position = local_position;
    } else {
        world
            .entity_mut(entity)
            .insert(Transform2D::from_position(local_position));
    }
    Ok(())
}

/// Destroy `entity` together with all of its descendants.
pub fn destroy(world: &mut World, entity: Entity) -> Result<(), HierarchyError> {
    ensure_exists(world, entity)?;
    let descendants = count_descendants(world, entity);
    world.entity_mut(entity).despawn();
    debug!("Destroyed {entity} and {descendants} descendant(s)");
    Ok(())
}

fn count_descendants(world: &World, entity: Entity) -> usize {
    children_of(world, entity)
        .into_iter()
        .map(|child| 1 + count_descendants(world, child))
        .sum()
}

/// Read-only hierarchy access for systems.
///
/// Runs the same lazy composition as [`world_transform`] against a query, so
/// it sees local writes made earlier in the tick by other systems.
#[derive(SystemParam)]
pub struct TransformHierarchy<'w, 's> {
    nodes: Query<
        'w,
        's,
        (
            Option<&'static Transform2D>,
            Option<&'static ChildOf>,
            Has<Inactive>,
        ),
    >,
}

impl TransformHierarchy<'_, '_> {
    pub fn world_transform(&self, entity: Entity) -> Result<GlobalTransform2D, HierarchyError> {
        compose_chain(entity, |node| {
            self.nodes.get(node).ok().map(|(local, child_of, _)| {
                (
                    local.copied().unwrap_or_default(),
                    child_of.map(ChildOf::parent),
                )
            })
        })
    }

    pub fn is_active_in_hierarchy(&self, entity: Entity) -> bool {
        active_chain(entity, |node| {
            self.nodes
                .get(node)
                .ok()
                .map(|(_, child_of, inactive)| (child_of.map(ChildOf::parent), inactive))
        })
    }
}

/// Activity lookups for systems that also write [`Transform2D`].
///
/// Reads only parent links and the [`Inactive`] marker, so it can sit next to
/// a `Query<&mut Transform2D>` in the same system.
#[derive(SystemParam)]
pub struct HierarchyActivity<'w, 's> {
    nodes: Query<'w, 's, (Option<&'static ChildOf>, Has<Inactive>)>,
}

impl HierarchyActivity<'_, '_> {
    /// False if `entity` is missing or it or any of its ancestors is
    /// [`Inactive`].
    pub fn is_active_in_hierarchy(&self, entity: Entity) -> bool {
        active_chain(entity, |node| {
            self.nodes
                .get(node)
                .ok()
                .map(|(child_of, inactive)| (child_of.map(ChildOf::parent), inactive))
        })
    }
}
