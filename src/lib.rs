//! Resolution engine behind the ygg launcher.
//!
//! Given items contributed by providers, the engine answers three questions:
//! what are an item's children, which actions apply to it, and which objects
//! satisfy an action's indirect argument. It then dispatches a chosen action.
//! All state lives on an explicit [`ResolutionContext`]; [`Engine`] wraps one
//! and exposes the id-based calls transports use.
//!
//! Root discovery (`find_root`) locates the installation directory holding
//! `schema/`, `config/` and `assets/` so binaries and tests agree on paths.

use anyhow::{Result, anyhow};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod cache;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod context;
pub mod directory;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod icon;
pub mod logging;
pub mod matcher;
pub mod plugins;
pub mod resolver;
pub mod root_catalog;
pub mod runtime;
pub mod session;
mod schema_loader;

pub use capability::{
    Action, ActionIcon, ActionOutcome, Provider, ProvidesIcon, SynthesizesProviderItem,
};
pub use catalog::{
    ActionHandle, ActionSpec, CapabilityRegistry, EntityId, Item, Meta, Plugin, RawItem,
    RegistryBuilder, TypeSet, types,
};
pub use config::EngineConfig;
pub use context::ResolutionContext;
pub use engine::{Engine, NO_PARENT};
pub use error::{EngineError, EngineResult};
pub use icon::{Icon, IconAssets, IconOrigin};
pub use root_catalog::{CorePlugin, ItemFilter, Preset};

const ROOT_SENTINEL: &str = config::CONFIG_SCHEMA_RELATIVE;
const ROOT_ENV: &str = "YGG_ROOT";

fn is_root(candidate: &Path) -> bool {
    candidate.join(ROOT_SENTINEL).is_file()
}

fn root_from_hint(hint: &str) -> Option<PathBuf> {
    let path = Path::new(hint);
    if hint.is_empty() || !is_root(path) {
        return None;
    }
    fs::canonicalize(path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let start = fs::canonicalize(start).ok()?;
    start.ancestors().find(|dir| is_root(dir)).map(Path::to_path_buf)
}

/// Locate the installation root.
///
/// Tries `YGG_ROOT`, then the directories above the running executable, then
/// the hint `build.rs` recorded at compile time.
pub fn find_root() -> Result<PathBuf> {
    env::var(ROOT_ENV)
        .ok()
        .and_then(|hint| root_from_hint(&hint))
        .or_else(|| {
            let exe = env::current_exe().ok()?;
            search_upwards(exe.parent()?)
        })
        .or_else(|| option_env!("YGG_ROOT_HINT").and_then(root_from_hint))
        .ok_or_else(|| {
            anyhow!(
                "Unable to locate the ygg installation root. Set {ROOT_ENV} to the directory holding schema/ and assets/."
            )
        })
}

/// Fallback-icon directory used when no configuration says otherwise.
pub fn default_assets_dir() -> PathBuf {
    find_root()
        .map(|root| root.join("assets"))
        .unwrap_or_else(|_| PathBuf::from("assets"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_dir_is_a_root() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
        assert!(is_root(manifest));
        assert!(search_upwards(&manifest.join("src")).is_some());
    }
}
