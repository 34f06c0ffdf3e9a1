//! Collision layer compatibility matrix.
//!
//! Each [`RectangleCollider`](crate::components::rectanglecollider::RectangleCollider)
//! carries a layer tag. The [`CollisionLayers`] resource lists which pairs of
//! layers may interact; the collision detector skips every other pair. The
//! relation is symmetric: allowing `("Player", "Obstacle")` also allows
//! `("Obstacle", "Player")`.
//!
//! When the resource is not present in the world every pair is tested.
//!
//! # Configuration
//!
//! ```ini
//! [collision]
//! player = Obstacle, Enemy
//! shot = Enemy
//! ```
//!
//! Keys are matched case-insensitively against layer names because the INI
//! parser lowercases keys; see [`CollisionLayers::allow`].

use bevy_ecs::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

/// Symmetric set of layer pairs allowed to collide.
#[derive(Debug, Clone, Resource, Default)]
pub struct CollisionLayers {
    pairs: FxHashMap<String, FxHashSet<String>>,
}

impl CollisionLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`allow`](Self::allow).
    pub fn with_pair(mut self, a: &str, b: &str) -> Self {
        self.allow(a, b);
        self
    }

    /// Let layers `a` and `b` collide with each other.
    pub fn allow(&mut self, a: &str, b: &str) {
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        self.pairs.entry(a.clone()).or_default().insert(b.clone());
        self.pairs.entry(b).or_default().insert(a);
    }

    /// Stop layers `a` and `b` from colliding.
    pub fn forbid(&mut self, a: &str, b: &str) {
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        if let Some(set) = self.pairs.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(set) = self.pairs.get_mut(&b) {
            set.remove(&a);
        }
    }

    pub fn can_collide(&self, a: &str, b: &str) -> bool {
        self.pairs
            .get(&a.to_lowercase())
            .is_some_and(|set| set.contains(&b.to_lowercase()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.values().all(FxHashSet::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_symmetric_and_case_insensitive() {
        let layers = CollisionLayers::new().with_pair("Player", "Obstacle");
        assert!(layers.can_collide("Player", "Obstacle"));
        assert!(layers.can_collide("obstacle", "PLAYER"));
        assert!(!layers.can_collide("Player", "Player"));
        assert!(!layers.can_collide("Shot", "Obstacle"));
    }

    #[test]
    fn forbid_removes_both_directions() {
        let mut layers = CollisionLayers::new().with_pair("Shot", "Enemy");
        layers.forbid("Enemy", "Shot");
        assert!(!layers.can_collide("Shot", "Enemy"));
        assert!(layers.is_empty());
    }
}
