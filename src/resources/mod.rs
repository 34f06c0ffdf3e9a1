//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution: timing, configuration, collision
//! bookkeeping, and the prefab registry.
//!
//! Overview
//! - `activecontacts` – collider pairs overlapping at the end of the last pass
//! - `collisionlayers` – which collision layers may interact
//! - `gameconfig` – INI-backed simulation, pool, and collision settings
//! - `prefabstore` – prefabs registered by name
//! - `worldtime` – simulation time and delta
pub mod activecontacts;
pub mod collisionlayers;
pub mod gameconfig;
pub mod prefabstore;
pub mod worldtime;
