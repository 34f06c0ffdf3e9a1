//! Harrier Engine library.
//!
//! This module exposes the engine's scene graph, colliders, object pools,
//! resources, systems, and events for use in integration tests and as a
//! reusable library.

pub mod components;
pub mod events;
pub mod game;
pub mod hierarchy;
pub mod pool;
pub mod resources;
pub mod systems;
