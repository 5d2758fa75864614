use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Id of the synthetic root that top-level item browsing expands.
pub const ITEM_CATALOG_ID: &str = "item-catalog";
/// Id of the synthetic root whose children are the registered actions.
pub const ACTION_CATALOG_ID: &str = "action-catalog";
/// Type tag carried only by the item catalog root.
pub const ITEM_CATALOG_TYPE: &str = "item-catalog";
/// Type tag carried only by the action catalog root.
pub const ACTION_CATALOG_TYPE: &str = "action-catalog";
/// Type tag every action carries when browsed as an item.
pub const ACTION_TYPE: &str = "action";
/// Extra type tag attached to items a provider synthesizes for itself.
pub const PROVIDER_TYPE: &str = "provider";

// Ids are truncated hashes; 16 bytes of sha256 keeps collisions out of reach
// for launcher-sized catalogs while staying readable in URLs.
const DERIVED_ID_BYTES: usize = 16;

/// Opaque, globally unique identifier of an item or action.
///
/// Providers may supply one; otherwise it is derived from the item's content
/// with [`EntityId::derive`], so structurally identical items share an id.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn item_catalog() -> Self {
        Self(ITEM_CATALOG_ID.to_string())
    }

    pub fn action_catalog() -> Self {
        Self(ACTION_CATALOG_ID.to_string())
    }

    /// Deterministic content hash over `(name, meta, types)`.
    ///
    /// `meta` is hashed in [`canonical_json`] form, so key order in the
    /// producing provider does not affect the id.
    pub fn derive(name: &str, meta: &Value, types: &TypeSet) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(canonical_json(meta).as_bytes());
        hasher.update([0u8]);
        for tag in types.iter() {
            hasher.update(tag.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..DERIVED_ID_BYTES]))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Compact JSON with object keys sorted at every level.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (idx, (key, item)) in entries.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Ordered set of type tags.
///
/// Insertion order is preserved (the first tag is the most specific one a
/// provider reports) and duplicates are dropped on construction. Matching is
/// always set intersection, never equality.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeSet(Vec<String>);

impl TypeSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|existing| existing == tag)
    }

    /// Append a tag unless it is already present.
    pub fn insert(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.contains(&tag) {
            self.0.push(tag);
        }
    }

    /// Builder form of [`TypeSet::insert`].
    pub fn with(mut self, tag: impl Into<String>) -> Self {
        self.insert(tag);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TypeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TypeSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'de> Deserialize<'de> for TypeSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tags = Vec::<String>::deserialize(deserializer)?;
        Ok(tags.into_iter().collect())
    }
}

/// Shorthand for building a [`TypeSet`] from string literals.
pub fn types<const N: usize>(tags: [&str; N]) -> TypeSet {
    tags.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derived_ids_are_stable_for_identical_content() {
        let tags = types(["public.folder"]);
        let a = EntityId::derive("bar", &json!({"path": "/foo/bar"}), &tags);
        let b = EntityId::derive("bar", &json!({"path": "/foo/bar"}), &tags);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), DERIVED_ID_BYTES * 2);
    }

    #[test]
    fn derived_ids_change_with_any_component() {
        let tags = types(["public.folder"]);
        let base = EntityId::derive("bar", &json!({"path": "/foo/bar"}), &tags);
        assert_ne!(
            base,
            EntityId::derive("baz", &json!({"path": "/foo/bar"}), &tags)
        );
        assert_ne!(
            base,
            EntityId::derive("bar", &json!({"path": "/foo/baz"}), &tags)
        );
        assert_ne!(
            base,
            EntityId::derive("bar", &json!({"path": "/foo/bar"}), &types(["public.item"]))
        );
    }

    #[test]
    fn derived_ids_ignore_meta_key_order() {
        let tags = types(["text/plain"]);
        let a = EntityId::derive("line", &json!({"index": 1, "path": "/a"}), &tags);
        let b = EntityId::derive(
            "line",
            &serde_json::from_str(r#"{"path": "/a", "index": 1}"#).unwrap(),
            &tags,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_json_sorts_nested_keys() {
        let value: Value =
            serde_json::from_str(r#"{"b": [{"z": 1, "y": "q"}], "a": null}"#).unwrap();
        assert_eq!(canonical_json(&value), r#"{"a":null,"b":[{"y":"q","z":1}]}"#);
    }

    #[test]
    fn type_set_drops_duplicates_and_keeps_order() {
        let set: TypeSet = serde_json::from_str(r#"["b", "a", "b"]"#).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(set.first(), Some("b"));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["b","a"]"#);
    }

    #[test]
    fn entity_id_round_trips_as_plain_string() {
        let id = EntityId::item_catalog();
        let serialized = serde_json::to_string(&id).unwrap();
        assert_eq!(serialized, "\"item-catalog\"");
        let parsed: EntityId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, id);
    }
}
