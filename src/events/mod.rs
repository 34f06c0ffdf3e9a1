//! Event types and observers used by the engine.
//!
//! Events provide a decoupled way for systems to communicate without direct
//! dependencies.
//!
//! Submodules:
//! - [`collision`] – contact notifications emitted by the collision system
pub mod collision;
