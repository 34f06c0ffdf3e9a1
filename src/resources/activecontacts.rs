//! Contacts that were overlapping at the end of the last collision pass.
//!
//! The collision detector diffs each tick's overlaps against this set to tell
//! new contacts from ongoing ones, and to notice contacts that ended.

use bevy_ecs::prelude::{Entity, Resource};
use rustc_hash::FxHashMap;

/// Ordered key for an unordered pair of entities.
pub fn contact_key(a: Entity, b: Entity) -> (Entity, Entity) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Overlapping pairs keyed by [`contact_key`], with their trigger flag.
#[derive(Debug, Clone, Resource, Default)]
pub struct ActiveContacts {
    pairs: FxHashMap<(Entity, Entity), bool>,
}

impl ActiveContacts {
    pub fn contains(&self, a: Entity, b: Entity) -> bool {
        self.pairs.contains_key(&contact_key(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs currently in contact, in ascending order.
    pub fn sorted_pairs(&self) -> Vec<(Entity, Entity)> {
        let mut pairs: Vec<_> = self.pairs.keys().copied().collect();
        pairs.sort_unstable();
        pairs
    }

    /// Store this tick's contacts and hand back the previous ones.
    pub fn replace(
        &mut self,
        current: FxHashMap<(Entity, Entity), bool>,
    ) -> FxHashMap<(Entity, Entity), bool> {
        std::mem::replace(&mut self.pairs, current)
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}
