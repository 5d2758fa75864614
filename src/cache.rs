//! Process-lifetime memo tables.
//!
//! Neither cache evicts: a provider is asked at most once per distinct
//! `(provider id, meta)` and an icon source at most once per entity id. Locks
//! are only held for the map operation itself, never across a provider call,
//! so two concurrent misses on one key both run the provider and the later
//! write wins with an equivalent value.

use crate::catalog::identity::{EntityId, canonical_json};
use crate::catalog::model::{Meta, RawItem};
use crate::icon::Icon;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared, immutable provider result.
pub type CachedItems = Arc<Vec<RawItem>>;

#[derive(Default)]
pub struct InvocationCache {
    entries: RwLock<HashMap<String, CachedItems>>,
}

impl InvocationCache {
    /// Deterministic key for a provider invocation.
    ///
    /// Payloads that differ only in object key order share a key.
    pub fn key(provider_id: &str, meta: &Meta) -> String {
        canonical_json(&serde_json::json!([provider_id, meta]))
    }

    pub fn get(&self, key: &str) -> Option<CachedItems> {
        self.entries.read().get(key).cloned()
    }

    /// Store a provider result and hand back the shared copy.
    pub fn insert(&self, key: String, items: Vec<RawItem>) -> CachedItems {
        let items = Arc::new(items);
        self.entries.write().insert(key, Arc::clone(&items));
        items
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[derive(Default)]
pub struct IconCache {
    entries: RwLock<HashMap<EntityId, Icon>>,
}

impl IconCache {
    pub fn get(&self, id: &EntityId) -> Option<Icon> {
        self.entries.read().get(id).cloned()
    }

    pub fn insert(&self, id: EntityId, icon: Icon) {
        self.entries.write().insert(id, icon);
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
