//! Explicit resolution state.
//!
//! Everything a resolution call reads or memoizes lives on one
//! [`ResolutionContext`] value that callers pass in, so independent engines
//! (and tests) never share caches.

use crate::cache::{CachedItems, IconCache, InvocationCache};
use crate::capability::Provider;
use crate::catalog::model::Meta;
use crate::catalog::registry::CapabilityRegistry;
use crate::directory::EntityDirectory;
use crate::error::{EngineError, EngineResult};
use crate::icon::IconAssets;
use std::sync::Arc;
use tracing::debug;

pub struct ResolutionContext {
    registry: Arc<CapabilityRegistry>,
    invocations: InvocationCache,
    icons: IconCache,
    directory: EntityDirectory,
    assets: IconAssets,
}

impl ResolutionContext {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self::with_assets(registry, IconAssets::default())
    }

    pub fn with_assets(registry: CapabilityRegistry, assets: IconAssets) -> Self {
        let directory = EntityDirectory::seeded(&registry);
        Self {
            registry: Arc::new(registry),
            invocations: InvocationCache::default(),
            icons: IconCache::default(),
            directory,
            assets,
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn invocations(&self) -> &InvocationCache {
        &self.invocations
    }

    pub fn icons(&self) -> &IconCache {
        &self.icons
    }

    pub fn directory(&self) -> &EntityDirectory {
        &self.directory
    }

    pub fn assets(&self) -> &IconAssets {
        &self.assets
    }

    /// Run `provider` for `meta` through the invocation cache.
    ///
    /// A hit returns the stored result without touching the provider. A
    /// failure is returned as-is and nothing is stored, so the next call
    /// retries.
    pub async fn run_provider(
        &self,
        provider: &dyn Provider,
        meta: &Meta,
    ) -> EngineResult<CachedItems> {
        let key = InvocationCache::key(provider.id(), meta);
        if let Some(items) = self.invocations.get(&key) {
            debug!(%key, "invocation cache hit");
            return Ok(items);
        }

        debug!(%key, "invocation cache miss");
        let items = provider
            .run(meta, self)
            .await
            .map_err(|source| EngineError::ProviderExecution {
                provider: provider.id().to_string(),
                source,
            })?;
        Ok(self.invocations.insert(key, items))
    }
}
