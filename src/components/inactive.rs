//! Inactive entity marker component.
//!
//! An entity carrying [`Inactive`] is switched off: movement and collision
//! dispatch ignore it and every descendant of it. Pools park their available
//! instances with this marker and remove it when handing an instance out.

use bevy_ecs::prelude::Component;

/// Tag component marking an entity (and its subtree) as inactive.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Inactive;
