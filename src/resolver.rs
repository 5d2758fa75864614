//! Catalog, action and indirect resolution.
//!
//! All three questions are answered by expanding an item through the
//! providers whose input types match it; actions are simply the children of
//! the action catalog root, and indirect candidates the children of a context
//! item, filtered by type.

use crate::catalog::identity::EntityId;
use crate::catalog::model::{Item, RawItem};
use crate::catalog::registry::CapabilityRegistry;
use crate::context::ResolutionContext;
use crate::error::EngineResult;
use crate::matcher::{accepts_direct, accepts_indirect};

/// Children of `parent`: every matching provider's output, concatenated in
/// registration order and annotated with id, parent and children flag.
///
/// Fails fast: if any provider fails, results already gathered from other
/// providers are dropped and the error is returned. Duplicate items from
/// different providers are kept.
pub async fn get_children_for_item(
    ctx: &ResolutionContext,
    parent: &Item,
) -> EngineResult<Vec<Item>> {
    let registry = ctx.registry();
    let mut children = Vec::new();
    for provider in registry.expanding(&parent.types) {
        let raw_items = ctx.run_provider(provider.as_ref(), &parent.meta).await?;
        children.extend(
            raw_items
                .iter()
                .cloned()
                .map(|raw| annotate(registry, raw, &parent.id)),
        );
    }
    ctx.directory().record(&children);
    Ok(children)
}

/// Actions whose direct types intersect `item`'s types, in registration order.
pub async fn get_actions_for_item(
    ctx: &ResolutionContext,
    item: &Item,
) -> EngineResult<Vec<Item>> {
    let actions = get_children_for_item(ctx, &Item::action_catalog()).await?;
    Ok(actions
        .into_iter()
        .filter(|action| accepts_direct(action, item))
        .collect())
}

/// Candidate indirect objects for `action`, drawn from the children of
/// `context_item` (the item catalog root when absent).
///
/// Returns an empty list without consulting any provider when the action
/// takes no indirect object.
pub async fn get_indirects_for_action(
    ctx: &ResolutionContext,
    context_item: Option<&Item>,
    action: &Item,
) -> EngineResult<Vec<Item>> {
    if action.indirect_types.is_none() {
        return Ok(Vec::new());
    }

    let root;
    let parent = match context_item {
        Some(item) => item,
        None => {
            root = Item::item_catalog();
            &root
        }
    };
    let candidates = get_children_for_item(ctx, parent).await?;
    Ok(candidates
        .into_iter()
        .filter(|candidate| accepts_indirect(action, candidate))
        .collect())
}

fn annotate(registry: &CapabilityRegistry, raw: RawItem, parent_id: &EntityId) -> Item {
    let has_children = registry.has_children(&raw.types);
    Item::from_raw(raw, parent_id.clone(), has_children)
}
