//! Process-wide `id -> entity` lookup.
//!
//! Maintained incrementally: every successful resolution records the items
//! it produced, so lookups are a single map read instead of a scan over all
//! cached provider results. The two catalog roots are always present.

use crate::catalog::identity::EntityId;
use crate::catalog::model::Item;
use crate::catalog::registry::CapabilityRegistry;
use parking_lot::RwLock;
use std::collections::HashMap;

pub struct EntityDirectory {
    entries: RwLock<HashMap<EntityId, Item>>,
}

impl EntityDirectory {
    /// Directory holding only the two catalog roots, with `has_children`
    /// computed against `registry`.
    pub fn seeded(registry: &CapabilityRegistry) -> Self {
        let mut entries = HashMap::new();
        for mut root in [Item::item_catalog(), Item::action_catalog()] {
            root.has_children = registry.has_children(&root.types);
            entries.insert(root.id.clone(), root);
        }
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, id: &EntityId) -> Option<Item> {
        self.entries.read().get(id).cloned()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Record resolved items. An item reached again (possibly through a
    /// different parent) replaces the earlier entry.
    pub fn record(&self, items: &[Item]) {
        if items.is_empty() {
            return;
        }
        let mut entries = self.entries.write();
        for item in items {
            entries.insert(item.id.clone(), item.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::identity::types;
    use crate::catalog::model::RawItem;

    #[test]
    fn roots_are_always_resolvable() {
        let directory = EntityDirectory::seeded(&CapabilityRegistry::default());
        assert_eq!(directory.len(), 2);
        assert!(directory.contains(&EntityId::item_catalog()));
        assert!(directory.get(&EntityId::action_catalog()).is_some());
        assert!(directory.get(&EntityId::new("nope")).is_none());
    }

    #[test]
    fn roots_have_no_children_without_providers() {
        let directory = EntityDirectory::seeded(&CapabilityRegistry::default());
        for id in [EntityId::item_catalog(), EntityId::action_catalog()] {
            let root = directory.get(&id).expect("root present");
            assert!(!root.has_children, "{id} should not be expandable");
        }
    }

    #[test]
    fn recorded_items_replace_earlier_entries() {
        let directory = EntityDirectory::seeded(&CapabilityRegistry::default());
        let raw = RawItem::new("bar", types(["public.folder"])).with_id("bar");
        let first = Item::from_raw(raw.clone(), EntityId::new("a"), false);
        let second = Item::from_raw(raw, EntityId::new("b"), true);

        directory.record(&[first]);
        directory.record(&[second]);

        let stored = directory.get(&EntityId::new("bar")).expect("recorded");
        assert_eq!(stored.parent_id, Some(EntityId::new("b")));
        assert!(stored.has_children);
        assert_eq!(directory.len(), 3);
    }
}
