//! Engine configuration: which presets populate the item catalog and where
//! fallback icons live.
//!
//! Config files are validated against `schema/engine_config.schema.json`
//! before deserialization, so structural mistakes are reported with JSON
//! pointers rather than serde's first-error message.

use crate::catalog::types;
use crate::plugins::file_system::FOLDER_PROVIDER_ID;
use crate::plugins::tags;
use crate::root_catalog::{ItemFilter, Preset, ROOT_CATALOG_PROVIDER_ID};
use crate::schema_loader::{load_json_schema, validate_instance};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: &str = "ygg_config_v1";
pub const CONFIG_ENV: &str = "YGG_CONFIG";
pub const CONFIG_SCHEMA_RELATIVE: &str = "schema/engine_config.schema.json";
const DEFAULT_CONFIG_RELATIVE: &str = "config/ygg.json";
const DEFAULT_ASSETS_RELATIVE: &str = "assets";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,
    pub presets: Vec<Preset>,
}

impl Default for EngineConfig {
    /// Built-in presets: home, Desktop, Downloads and the usual application
    /// directories.
    fn default() -> Self {
        let apps_only = ItemFilter::AllOf {
            filters: vec![
                ItemFilter::NotHidden,
                ItemFilter::HasType {
                    types: types([tags::APPLICATION]),
                },
            ],
        };
        let folder = |path: &str| Preset::new(FOLDER_PROVIDER_ID, json!({ "path": path }));
        Self {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            assets_dir: None,
            presets: vec![
                folder("~")
                    .with_filter(ItemFilter::NotHidden)
                    .with_provider_item(),
                folder("~/Desktop").with_filter(ItemFilter::NotHidden),
                folder("~/Downloads").with_filter(ItemFilter::NotHidden),
                folder("/Applications").with_filter(apps_only.clone()),
                folder("/System/Applications").with_filter(apps_only.clone()),
                folder("/usr/share/applications").with_filter(apps_only),
            ],
        }
    }
}

impl EngineConfig {
    /// Load, schema-validate and sanity-check a config file.
    pub fn load(path: &Path, schema_path: &Path) -> Result<Self> {
        let value: Value = serde_json::from_reader(BufReader::new(
            File::open(path).with_context(|| format!("opening config {}", path.display()))?,
        ))
        .with_context(|| format!("parsing config {}", path.display()))?;

        let allowed = BTreeSet::from([CONFIG_SCHEMA_VERSION.to_string()]);
        let schema = load_json_schema(schema_path, &allowed)
            .with_context(|| format!("loading config schema {}", schema_path.display()))?;
        tracing::debug!(
            config = %path.display(),
            schema_version = %schema.schema_version,
            "validating config"
        );
        validate_instance(&schema, &value, &format!("config {}", path.display()))?;

        let config: EngineConfig = serde_json::from_value(value)
            .with_context(|| format!("decoding config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config at `explicit`, `$YGG_CONFIG`, or `<root>/config/ygg.json`,
    /// falling back to the built-in presets when none of those exist.
    pub fn discover(explicit: Option<&Path>, root: Option<&Path>) -> Result<Self> {
        let schema_path = resolve_schema_path(root);
        if let Some(path) = explicit {
            return Self::load(path, &schema_path);
        }
        if let Some(path) = env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
            return Self::load(Path::new(&path), &schema_path);
        }
        if let Some(path) = root.map(|root| root.join(DEFAULT_CONFIG_RELATIVE)) {
            if path.is_file() {
                return Self::load(&path, &schema_path);
            }
        }
        tracing::debug!("no config file found; using built-in presets");
        Ok(Self::default())
    }

    /// Fallback-icon directory: explicit setting (relative to `root`), else
    /// `<root>/assets`.
    pub fn assets_dir(&self, root: Option<&Path>) -> PathBuf {
        match (&self.assets_dir, root) {
            (Some(dir), Some(root)) if dir.is_relative() => root.join(dir),
            (Some(dir), _) => dir.clone(),
            (None, Some(root)) => root.join(DEFAULT_ASSETS_RELATIVE),
            (None, None) => PathBuf::from(DEFAULT_ASSETS_RELATIVE),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.schema_version != CONFIG_SCHEMA_VERSION {
            bail!(
                "schema_version '{}' not supported (expected {})",
                self.schema_version,
                CONFIG_SCHEMA_VERSION
            );
        }
        for (idx, preset) in self.presets.iter().enumerate() {
            if preset.provider.trim().is_empty() {
                bail!("preset #{} has an empty provider id", idx + 1);
            }
            if preset.provider == ROOT_CATALOG_PROVIDER_ID {
                bail!("preset #{} targets the root catalog provider itself", idx + 1);
            }
        }
        Ok(())
    }
}

/// Schema path under `root` when present there, else the copy shipped with
/// the crate sources.
pub fn resolve_schema_path(root: Option<&Path>) -> PathBuf {
    if let Some(candidate) = root.map(|root| root.join(CONFIG_SCHEMA_RELATIVE)) {
        if candidate.exists() {
            return candidate;
        }
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(CONFIG_SCHEMA_RELATIVE)
}
