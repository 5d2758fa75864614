//! Capability contracts implemented by plugins.
//!
//! Providers and actions expose one required operation plus optional
//! capabilities. Optional capabilities are discovered by presence: the
//! accessor returns `Some(self)` when the implementor supports it, so the
//! engine never guesses at an object's shape.

use crate::catalog::identity::TypeSet;
use crate::catalog::model::{ActionSpec, Item, Meta, RawItem};
use crate::context::ResolutionContext;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Expands items of matching type tags into children.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Registry-unique id; also the first half of the invocation cache key.
    fn id(&self) -> &str;

    /// Parent type tags this provider can expand.
    fn input_types(&self) -> &TypeSet;

    /// Item type tags this provider can render icons for.
    fn output_types(&self) -> Option<&TypeSet> {
        None
    }

    /// Produce the children for a parent whose payload is `meta`.
    ///
    /// The context is available so meta-providers can reach the registry and
    /// invocation cache; leaf providers ignore it.
    async fn run(&self, meta: &Meta, ctx: &ResolutionContext) -> Result<Vec<RawItem>>;

    fn icons(&self) -> Option<&dyn ProvidesIcon> {
        None
    }

    fn provider_items(&self) -> Option<&dyn SynthesizesProviderItem> {
        None
    }
}

/// Optional provider capability: icon bytes for an item it can render.
#[async_trait]
pub trait ProvidesIcon: Send + Sync {
    async fn icon(&self, meta: &Meta) -> Result<Bytes>;
}

/// Optional provider capability: an item representing the provider itself
/// for a given payload (e.g. the folder a preset lists).
#[async_trait]
pub trait SynthesizesProviderItem: Send + Sync {
    async fn make_provider_item(&self, meta: &Meta) -> Result<RawItem>;
}

/// Outcome reported by an action handler.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ActionOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionOutcome {
    pub fn done() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Side-effecting operation applicable to items matching its direct types.
#[async_trait]
pub trait Action: Send + Sync {
    fn spec(&self) -> &ActionSpec;

    async fn run(&self, direct: &Item, indirect: Option<&Item>) -> Result<ActionOutcome>;

    fn icon(&self) -> Option<&dyn ActionIcon> {
        None
    }
}

/// Optional action capability: the action's own icon.
#[async_trait]
pub trait ActionIcon: Send + Sync {
    async fn icon(&self) -> Result<Bytes>;
}
