//! Id-based facade used by transports.
//!
//! Transports only ever hold opaque id strings. Every call resolves ids
//! through the entity directory, so an id is usable once some earlier
//! resolution has returned it. The catalog roots are always resolvable.

use crate::capability::ActionOutcome;
use crate::catalog::identity::EntityId;
use crate::catalog::model::Item;
use crate::catalog::registry::CapabilityRegistry;
use crate::config::EngineConfig;
use crate::context::ResolutionContext;
use crate::error::{EngineError, EngineResult};
use crate::icon::{Icon, IconAssets};
use crate::plugins::{FileSystemPlugin, PlainTextPlugin};
use crate::root_catalog::CorePlugin;
use crate::{dispatch, icon, resolver};
use anyhow::Result;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// Reserved id meaning "no parent": resolves to the item catalog root.
pub const NO_PARENT: &str = "default";

pub struct Engine {
    ctx: ResolutionContext,
}

impl Engine {
    pub fn new(ctx: ResolutionContext) -> Self {
        Self { ctx }
    }

    /// Engine with the core, file-system and plain-text plugins, in that order.
    pub fn from_config(config: &EngineConfig, root: Option<&Path>) -> Result<Self> {
        let registry = CapabilityRegistry::builder()
            .plugin(&CorePlugin::new(config.presets.clone()))
            .plugin(&FileSystemPlugin)
            .plugin(&PlainTextPlugin)
            .build()?;
        let assets = IconAssets::from_dir(&config.assets_dir(root));
        Ok(Self::new(ResolutionContext::with_assets(registry, assets)))
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.ctx
    }

    pub fn get_item_by_id(&self, id: &EntityId) -> EngineResult<Item> {
        self.ctx
            .directory()
            .get(id)
            .ok_or_else(|| EngineError::UnknownEntity(id.clone()))
    }

    /// Children of `id`; `None` or [`NO_PARENT`] lists the item catalog.
    pub async fn get_children_for_item(&self, id: Option<&EntityId>) -> EngineResult<Vec<Item>> {
        let parent = self.parent_or_root(id)?;
        resolver::get_children_for_item(&self.ctx, &parent).await
    }

    pub async fn get_actions_for_item(&self, id: &EntityId) -> EngineResult<Vec<Item>> {
        let item = self.get_item_by_id(id)?;
        resolver::get_actions_for_item(&self.ctx, &item).await
    }

    pub async fn get_indirects_for_action(
        &self,
        item_id: Option<&EntityId>,
        action_id: &EntityId,
    ) -> EngineResult<Vec<Item>> {
        let context_item = self.parent_or_root(item_id)?;
        let action = self.get_item_by_id(action_id)?;
        resolver::get_indirects_for_action(&self.ctx, Some(&context_item), &action).await
    }

    pub async fn run_action(
        &self,
        direct_id: &EntityId,
        action_id: &EntityId,
        indirect_id: Option<&EntityId>,
    ) -> EngineResult<ActionOutcome> {
        dispatch::run_action(&self.ctx, direct_id, action_id, indirect_id).await
    }

    pub async fn get_icon_for_item(&self, id: &EntityId) -> EngineResult<Icon> {
        let item = self.get_item_by_id(id)?;
        icon::get_icon_for_item(&self.ctx, &item).await
    }

    pub async fn get_icon_for_action(&self, id: &EntityId) -> EngineResult<Icon> {
        let action = self.get_item_by_id(id)?;
        icon::get_icon_for_action(&self.ctx, &action).await
    }

    /// Expand both catalog roots once so later calls hit the cache. Failures
    /// are logged and otherwise ignored.
    pub async fn prime(&self) {
        for root in [Item::item_catalog(), Item::action_catalog()] {
            let started = Instant::now();
            match resolver::get_children_for_item(&self.ctx, &root).await {
                Ok(children) => info!(
                    root = %root.id,
                    children = children.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "primed catalog"
                ),
                Err(err) => error!(root = %root.id, error = %err.report(), "priming failed"),
            }
        }
    }

    fn parent_or_root(&self, id: Option<&EntityId>) -> EngineResult<Item> {
        match id {
            Some(id) if id.as_str() != NO_PARENT => self.get_item_by_id(id),
            _ => self.get_item_by_id(&EntityId::item_catalog()),
        }
    }
}
