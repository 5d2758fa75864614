//! Icon resolution with provider delegation and fallback images.
//!
//! Successful provider or action icons are memoized per entity id. Fallback
//! images are re-read on every request and never cached, so a source that
//! later gains an icon is picked up. Failures come back as
//! [`EngineError::IconResolution`] and are not cached either.

use crate::catalog::model::Item;
use crate::context::ResolutionContext;
use crate::error::{EngineError, EngineResult};
use anyhow::Context;
use bytes::Bytes;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MISSING_ICON_FILE: &str = "missing.png";
pub const ACTION_ICON_FILE: &str = "action.png";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconOrigin {
    Provider,
    Action,
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Icon {
    pub bytes: Bytes,
    pub origin: IconOrigin,
}

#[derive(Clone, Debug)]
/// Locations of the fallback images.
pub struct IconAssets {
    pub missing: PathBuf,
    pub action: PathBuf,
}

impl IconAssets {
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            missing: dir.join(MISSING_ICON_FILE),
            action: dir.join(ACTION_ICON_FILE),
        }
    }
}

impl Default for IconAssets {
    fn default() -> Self {
        Self::from_dir(&crate::default_assets_dir())
    }
}

/// Icon for an item: the first provider whose output types match renders
/// it; otherwise the missing-icon image.
pub async fn get_icon_for_item(ctx: &ResolutionContext, item: &Item) -> EngineResult<Icon> {
    if let Some(icon) = ctx.icons().get(&item.id) {
        debug!(id = %item.id, "icon cache hit");
        return Ok(icon);
    }

    let source = ctx
        .registry()
        .icon_provider(&item.types)
        .and_then(|provider| provider.icons().map(|icons| (provider.id(), icons)));
    let Some((provider_id, icons)) = source else {
        return fallback(item, &ctx.assets().missing).await;
    };

    debug!(id = %item.id, provider = provider_id, "icon cache miss");
    match icons.icon(&item.meta).await {
        Ok(bytes) => {
            let icon = Icon {
                bytes,
                origin: IconOrigin::Provider,
            };
            ctx.icons().insert(item.id.clone(), icon.clone());
            Ok(icon)
        }
        Err(source) => {
            let error = format!("{source:#}");
            warn!(id = %item.id, provider = provider_id, %error, "icon provider failed");
            Err(EngineError::IconResolution {
                id: item.id.clone(),
                source,
            })
        }
    }
}

/// Icon for an action: its own icon capability if declared, otherwise the
/// generic action image.
pub async fn get_icon_for_action(ctx: &ResolutionContext, action: &Item) -> EngineResult<Icon> {
    if let Some(icon) = ctx.icons().get(&action.id) {
        debug!(id = %action.id, "icon cache hit");
        return Ok(icon);
    }

    let Some(icons) = action.action.as_ref().and_then(|handle| handle.action().icon()) else {
        return fallback(action, &ctx.assets().action).await;
    };

    debug!(id = %action.id, "icon cache miss");
    match icons.icon().await {
        Ok(bytes) => {
            let icon = Icon {
                bytes,
                origin: IconOrigin::Action,
            };
            ctx.icons().insert(action.id.clone(), icon.clone());
            Ok(icon)
        }
        Err(source) => {
            let error = format!("{source:#}");
            warn!(id = %action.id, %error, "action icon failed");
            Err(EngineError::IconResolution {
                id: action.id.clone(),
                source,
            })
        }
    }
}

async fn fallback(item: &Item, path: &Path) -> EngineResult<Icon> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading fallback icon {}", path.display()))
        .map_err(|source| EngineError::IconResolution {
            id: item.id.clone(),
            source,
        })?;
    Ok(Icon {
        bytes: Bytes::from(bytes),
        origin: IconOrigin::Fallback,
    })
}
