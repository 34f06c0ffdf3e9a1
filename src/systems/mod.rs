//! Engine systems.
//!
//! This module groups the ECS systems that advance the simulation.
//!
//! Submodules overview
//! - [`collision`] – broad phase plus separating-axis overlap checks and event emission
//! - [`movement`] – integrate positions from rigid body velocities and time
//! - [`time`] – update simulation time and delta

pub mod collision;
pub mod movement;
pub mod time;
