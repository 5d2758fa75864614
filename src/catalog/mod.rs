//! Entity identity, item shapes and the capability registry.
//!
//! `identity` holds ids, type-tag sets and the reserved catalog names;
//! `model` the raw/annotated item shapes; `registry` the startup-assembled
//! provider and action lists every resolution call consults.

pub mod identity;
pub mod model;
pub mod registry;

pub use identity::{
    ACTION_CATALOG_ID, ACTION_CATALOG_TYPE, ACTION_TYPE, EntityId, ITEM_CATALOG_ID,
    ITEM_CATALOG_TYPE, PROVIDER_TYPE, TypeSet, types,
};
pub use model::{ActionHandle, ActionSpec, Item, Meta, RawItem};
pub use registry::{CapabilityRegistry, Plugin, RegistryBuilder};
