//! Meta-providers behind the two catalog roots.
//!
//! The root catalog provider expands `item-catalog` by running a fixed list
//! of presets, each naming another provider and the payload to hand it. A
//! preset that cannot be served (unknown provider, provider failure) is
//! logged and contributes nothing; its siblings are unaffected. The action
//! catalog provider lists every registered action as a browsable item.

use crate::capability::Provider;
use crate::catalog::identity::{
    ACTION_CATALOG_TYPE, ITEM_CATALOG_TYPE, PROVIDER_TYPE, TypeSet,
};
use crate::catalog::model::{ActionHandle, Meta, RawItem};
use crate::catalog::registry::Plugin;
use crate::context::ResolutionContext;
use crate::error::EngineError;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const ROOT_CATALOG_PROVIDER_ID: &str = "catalog";
pub const ACTION_CATALOG_PROVIDER_ID: &str = "actionCatalog";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Post-filter applied to a preset's items.
pub enum ItemFilter {
    /// Name does not start with a dot.
    NotHidden,
    /// Item carries at least one of `types`.
    HasType { types: TypeSet },
    /// Item carries none of `types`.
    LacksType { types: TypeSet },
    /// Every nested filter matches.
    AllOf { filters: Vec<ItemFilter> },
}

impl ItemFilter {
    pub fn matches(&self, item: &RawItem) -> bool {
        match self {
            ItemFilter::NotHidden => !item.name.starts_with('.'),
            ItemFilter::HasType { types } => crate::matcher::intersects(&item.types, types),
            ItemFilter::LacksType { types } => !crate::matcher::intersects(&item.types, types),
            ItemFilter::AllOf { filters } => filters.iter().all(|filter| filter.matches(item)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One top-level catalog entry source.
pub struct Preset {
    /// Id of the provider to run.
    pub provider: String,
    /// Payload passed to that provider.
    #[serde(default)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ItemFilter>,
    /// Also ask the provider for an item representing itself, tagged `provider`.
    #[serde(default)]
    pub include_provider_item: bool,
}

impl Preset {
    pub fn new(provider: impl Into<String>, meta: Meta) -> Self {
        Self {
            provider: provider.into(),
            meta,
            filter: None,
            include_provider_item: false,
        }
    }

    pub fn with_filter(mut self, filter: ItemFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_provider_item(mut self) -> Self {
        self.include_provider_item = true;
        self
    }

    fn accepts(&self, item: &RawItem) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter.matches(item))
    }
}

/// Expands the item catalog root from presets.
pub struct RootCatalogProvider {
    input_types: TypeSet,
    presets: Vec<Preset>,
}

impl RootCatalogProvider {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self {
            input_types: TypeSet::new().with(ITEM_CATALOG_TYPE),
            presets,
        }
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }
}

#[async_trait]
impl Provider for RootCatalogProvider {
    fn id(&self) -> &str {
        ROOT_CATALOG_PROVIDER_ID
    }

    fn input_types(&self) -> &TypeSet {
        &self.input_types
    }

    async fn run(&self, _meta: &Meta, ctx: &ResolutionContext) -> Result<Vec<RawItem>> {
        let batches = join_all(self.presets.iter().map(|preset| expand_preset(ctx, preset))).await;
        Ok(batches.into_iter().flatten().collect())
    }
}

async fn expand_preset(ctx: &ResolutionContext, preset: &Preset) -> Vec<RawItem> {
    if preset.provider == ROOT_CATALOG_PROVIDER_ID {
        warn!(provider = %preset.provider, "preset targets the root catalog itself; skipping");
        return Vec::new();
    }
    let Some(provider) = ctx.registry().provider(&preset.provider) else {
        let err = EngineError::ProviderNotRegistered(preset.provider.clone());
        warn!(error = %err.report(), "skipping preset");
        return Vec::new();
    };

    let mut items = Vec::new();
    if preset.include_provider_item {
        match provider.provider_items() {
            Some(synthesizer) => match synthesizer.make_provider_item(&preset.meta).await {
                Ok(mut item) => {
                    item.types.insert(PROVIDER_TYPE);
                    items.push(item);
                }
                Err(err) => {
                    let error = format!("{err:#}");
                    warn!(provider = %preset.provider, %error, "provider item failed");
                }
            },
            None => {
                warn!(
                    provider = %preset.provider,
                    "provider cannot describe itself; no provider item"
                );
            }
        }
    }

    match ctx.run_provider(provider.as_ref(), &preset.meta).await {
        Ok(children) => items.extend(
            children
                .iter()
                .filter(|item| preset.accepts(item))
                .cloned(),
        ),
        Err(err) => {
            warn!(error = %err.report(), "preset failed; contributing no items");
        }
    }
    items
}

/// Lists every registered action under the action catalog root.
pub struct ActionCatalogProvider {
    input_types: TypeSet,
}

impl Default for ActionCatalogProvider {
    fn default() -> Self {
        Self {
            input_types: TypeSet::new().with(ACTION_CATALOG_TYPE),
        }
    }
}

#[async_trait]
impl Provider for ActionCatalogProvider {
    fn id(&self) -> &str {
        ACTION_CATALOG_PROVIDER_ID
    }

    fn input_types(&self) -> &TypeSet {
        &self.input_types
    }

    async fn run(&self, _meta: &Meta, ctx: &ResolutionContext) -> Result<Vec<RawItem>> {
        Ok(ctx
            .registry()
            .actions()
            .iter()
            .map(|action| {
                let mut item = action.spec().to_raw_item();
                item.action = Some(ActionHandle(Arc::clone(action)));
                item
            })
            .collect())
    }
}

/// Registers the two catalog meta-providers.
pub struct CorePlugin {
    presets: Vec<Preset>,
}

impl CorePlugin {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }
}

impl Plugin for CorePlugin {
    fn name(&self) -> &str {
        "core"
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        vec![
            Arc::new(RootCatalogProvider::new(self.presets.clone())),
            Arc::new(ActionCatalogProvider::default()),
        ]
    }
}
