//! Type-tag matching.
//!
//! Every eligibility question in the engine reduces to "do these two tag sets
//! share at least one tag". There is no ordering, weighting or exact-match
//! mode; when several capabilities match, all of them apply.

use crate::capability::Provider;
use crate::catalog::identity::TypeSet;
use crate::catalog::model::Item;

/// True iff the two sets share at least one tag.
pub fn intersects(types: &TypeSet, filter: &TypeSet) -> bool {
    types.iter().any(|tag| filter.contains(tag))
}

/// Provider can expand an entity carrying `types`.
pub fn provider_expands(provider: &dyn Provider, types: &TypeSet) -> bool {
    intersects(types, provider.input_types())
}

/// Provider can render icons for an entity carrying `types`.
pub fn provider_renders(provider: &dyn Provider, types: &TypeSet) -> bool {
    provider
        .output_types()
        .is_some_and(|output| intersects(types, output))
}

/// `action` accepts `item` as its direct object.
pub fn accepts_direct(action: &Item, item: &Item) -> bool {
    action.is_action() && intersects(&item.types, &action.direct_types)
}

/// `candidate` satisfies the indirect filter of `action`. Actions without
/// indirect types accept nothing.
pub fn accepts_indirect(action: &Item, candidate: &Item) -> bool {
    action
        .indirect_types
        .as_ref()
        .is_some_and(|indirect| intersects(&candidate.types, indirect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::identity::{EntityId, types};
    use crate::catalog::model::{ActionSpec, RawItem};

    fn item(tags: TypeSet) -> Item {
        Item::from_raw(RawItem::new("x", tags), EntityId::item_catalog(), false)
    }

    fn action(spec: ActionSpec) -> Item {
        Item::from_raw(spec.to_raw_item(), EntityId::action_catalog(), false)
    }

    #[test]
    fn intersection_is_symmetric_and_any_overlap_counts() {
        let a = types(["public.folder", "public.item"]);
        let b = types(["public.item"]);
        assert!(intersects(&a, &b));
        assert!(intersects(&b, &a));
        assert!(!intersects(&a, &types(["public.image"])));
    }

    #[test]
    fn empty_sets_never_match() {
        assert!(!intersects(&TypeSet::new(), &types(["a"])));
        assert!(!intersects(&types(["a"]), &TypeSet::new()));
    }

    #[test]
    fn direct_match_requires_action_tag() {
        let folder = item(types(["public.folder"]));
        let open = action(ActionSpec::new("Open", types(["public.folder"])));
        assert!(accepts_direct(&open, &folder));

        let mut untagged = open.clone();
        untagged.types = types(["public.item"]);
        assert!(!accepts_direct(&untagged, &folder));
    }

    #[test]
    fn indirect_match_needs_declared_indirect_types() {
        let app = item(types(["com.apple.application"]));
        let open = action(ActionSpec::new("Open", types(["public.item"])));
        assert!(!accepts_indirect(&open, &app));

        let open_with = action(
            ActionSpec::new("Open With", types(["public.item"]))
                .with_indirect_types(types(["com.apple.application"])),
        );
        assert!(accepts_indirect(&open_with, &app));
        assert!(!accepts_indirect(&open_with, &item(types(["public.folder"]))));
    }
}
