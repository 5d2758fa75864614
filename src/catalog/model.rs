//! Item shapes that flow through the engine.
//!
//! Providers return [`RawItem`]s; the catalog resolver annotates them into
//! [`Item`]s (id, parent, children flag). Actions travel through the same
//! pipeline: an action is an item tagged `action` that additionally carries
//! its direct/indirect type filters and a handle to its handler.

use crate::capability::Action;
use crate::catalog::identity::{
    ACTION_CATALOG_TYPE, ACTION_TYPE, EntityId, ITEM_CATALOG_TYPE, TypeSet,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Provider-defined payload attached to an item; opaque to the engine.
pub type Meta = Value;

/// Cheap, clonable reference to a registered action's handler.
#[derive(Clone)]
pub struct ActionHandle(pub Arc<dyn Action>);

impl ActionHandle {
    pub fn action(&self) -> &dyn Action {
        self.0.as_ref()
    }
}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionHandle")
            .field(&self.0.spec().name)
            .finish()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Item as produced by a provider, before the engine annotates it.
pub struct RawItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub types: TypeSet,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "TypeSet::is_empty")]
    pub direct_types: TypeSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirect_types: Option<TypeSet>,
    #[serde(skip)]
    pub action: Option<ActionHandle>,
}

impl RawItem {
    pub fn new(name: impl Into<String>, types: TypeSet) -> Self {
        Self {
            name: name.into(),
            types,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_direct_types(mut self, direct_types: TypeSet) -> Self {
        self.direct_types = direct_types;
        self
    }

    pub fn with_indirect_types(mut self, indirect_types: TypeSet) -> Self {
        self.indirect_types = Some(indirect_types);
        self
    }

    /// Id the item resolves to: the provider's own, or the content hash.
    pub fn resolved_id(&self) -> EntityId {
        self.id
            .clone()
            .unwrap_or_else(|| EntityId::derive(&self.name, &self.meta, &self.types))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Annotated item as returned to callers and stored in the entity directory.
///
/// `parent_id` points at the item whose expansion produced this one; it is a
/// back-reference only. `has_children` is recomputed on every resolution.
pub struct Item {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub types: TypeSet,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default, skip_serializing_if = "TypeSet::is_empty")]
    pub direct_types: TypeSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirect_types: Option<TypeSet>,
    #[serde(skip)]
    pub action: Option<ActionHandle>,
}

impl Item {
    /// Annotate a raw provider item.
    pub fn from_raw(raw: RawItem, parent_id: EntityId, has_children: bool) -> Self {
        let id = raw.resolved_id();
        Self {
            id,
            name: raw.name,
            detail: raw.detail,
            types: raw.types,
            meta: raw.meta,
            parent_id: Some(parent_id),
            has_children,
            direct_types: raw.direct_types,
            indirect_types: raw.indirect_types,
            action: raw.action,
        }
    }

    /// Synthetic root for top-level item browsing.
    pub fn item_catalog() -> Self {
        Self::root(EntityId::item_catalog(), "Catalog", ITEM_CATALOG_TYPE)
    }

    /// Synthetic root whose children are every registered action.
    pub fn action_catalog() -> Self {
        Self::root(EntityId::action_catalog(), "Actions", ACTION_CATALOG_TYPE)
    }

    // `has_children` starts false; the entity directory fills it in from the
    // registry it is seeded with.
    fn root(id: EntityId, name: &str, tag: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            detail: None,
            types: TypeSet::new().with(tag),
            meta: Value::Null,
            parent_id: None,
            has_children: false,
            direct_types: TypeSet::new(),
            indirect_types: None,
            action: None,
        }
    }

    pub fn is_action(&self) -> bool {
        self.types.contains(ACTION_TYPE)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Static description of an action, as registered by a plugin.
pub struct ActionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub direct_types: TypeSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirect_types: Option<TypeSet>,
}

impl ActionSpec {
    pub fn new(name: impl Into<String>, direct_types: TypeSet) -> Self {
        Self {
            name: name.into(),
            direct_types,
            ..Self::default()
        }
    }

    pub fn with_indirect_types(mut self, indirect_types: TypeSet) -> Self {
        self.indirect_types = Some(indirect_types);
        self
    }

    /// Browsable representation of the action, tagged `action`.
    ///
    /// `meta` carries the name and both type sets, so the content-hash id is
    /// stable across restarts and two actions sharing a name stay distinct.
    pub fn to_raw_item(&self) -> RawItem {
        RawItem {
            id: self.id.clone(),
            name: self.name.clone(),
            detail: self.detail.clone(),
            types: TypeSet::new().with(ACTION_TYPE),
            meta: serde_json::json!({
                "action": self.name,
                "directTypes": self.direct_types,
                "indirectTypes": self.indirect_types,
            }),
            direct_types: self.direct_types.clone(),
            indirect_types: self.indirect_types.clone(),
            action: None,
        }
    }
}
