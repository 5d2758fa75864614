//! Leaf data sources shipped with the engine.
//!
//! These are ordinary plugins: the engine only sees the providers and actions
//! they register. Type tags follow Uniform Type Identifier naming so catalogs
//! produced on macOS and elsewhere share vocabulary.

use crate::catalog::model::Meta;
use anyhow::{Result, anyhow};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub mod file_system;
pub mod plain_text;

pub use file_system::FileSystemPlugin;
pub use plain_text::PlainTextPlugin;

/// Content-type tags used by the bundled plugins.
pub mod tags {
    pub const ITEM: &str = "public.item";
    pub const FOLDER: &str = "public.folder";
    pub const DIRECTORY: &str = "public.directory";
    pub const DATA: &str = "public.data";
    pub const TEXT: &str = "public.text";
    pub const PLAIN_TEXT: &str = "public.plain-text";
    pub const IMAGE: &str = "public.image";
    pub const APPLICATION: &str = "com.apple.application";
    pub const TEXT_LINE: &str = "text/plain";
}

/// `meta.path` of an item produced by a filesystem-backed provider.
pub(crate) fn meta_path(meta: &Meta) -> Result<PathBuf> {
    meta.get("path")
        .and_then(Value::as_str)
        .filter(|path| !path.is_empty())
        .map(expand_tilde)
        .ok_or_else(|| anyhow!("item meta carries no path"))
}

/// Expand a leading `~` to the home directory.
pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (path, Some(home)) if path.starts_with("~/") => home.join(&path[2..]),
        (path, _) => PathBuf::from(path),
    }
}

/// Display form of a path with the home directory abbreviated to `~`.
pub(crate) fn abbreviate_home(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}
