//! Prefab registry.
//!
//! Stores shared [`Prefab`] recipes under string keys so factories can look
//! them up by name when they build their pools. Prefabs are immutable and
//! handed out as `Arc`s, so several pools may share one.

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

use crate::pool::Prefab;

/// Central registry of prefabs keyed by name.
#[derive(Resource, Default)]
pub struct PrefabStore {
    prefabs: FxHashMap<String, Arc<dyn Prefab>>,
}

impl PrefabStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `prefab` under its own name, replacing any previous entry.
    pub fn insert(&mut self, prefab: Arc<dyn Prefab>) {
        self.prefabs.insert(prefab.name().to_string(), prefab);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Prefab>> {
        self.prefabs.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prefabs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}
