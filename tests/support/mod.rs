#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;
use ygg::{
    Action, ActionIcon, ActionOutcome, ActionSpec, CapabilityRegistry, CorePlugin, IconAssets,
    Item, Meta, Preset, Provider, ProvidesIcon, RawItem, ResolutionContext, TypeSet,
};

pub const MISSING_ICON: &[u8] = b"missing-icon";
pub const ACTION_ICON: &[u8] = b"action-icon";

/// Provider returning canned items per `meta.path`, counting invocations.
pub struct ScriptedProvider {
    id: String,
    input_types: TypeSet,
    output_types: Option<TypeSet>,
    listings: HashMap<String, Vec<RawItem>>,
    icon: Option<Bytes>,
    pub runs: AtomicUsize,
    pub icon_calls: AtomicUsize,
    pub fail_runs: AtomicBool,
    pub fail_icons: AtomicBool,
}

impl ScriptedProvider {
    pub fn new(id: &str, input_types: TypeSet) -> Self {
        Self {
            id: id.to_string(),
            input_types,
            output_types: None,
            listings: HashMap::new(),
            icon: None,
            runs: AtomicUsize::new(0),
            icon_calls: AtomicUsize::new(0),
            fail_runs: AtomicBool::new(false),
            fail_icons: AtomicBool::new(false),
        }
    }

    /// Items returned when `meta.path == path`; a null meta uses `""`.
    pub fn listing(mut self, path: &str, items: Vec<RawItem>) -> Self {
        self.listings.insert(path.to_string(), items);
        self
    }

    pub fn renders(mut self, output_types: TypeSet, icon: &'static [u8]) -> Self {
        self.output_types = Some(output_types);
        self.icon = Some(Bytes::from_static(icon));
        self
    }

    /// Declares output types without an icon capability.
    pub fn claims_output(mut self, output_types: TypeSet) -> Self {
        self.output_types = Some(output_types);
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn icon_calls(&self) -> usize {
        self.icon_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn input_types(&self) -> &TypeSet {
        &self.input_types
    }

    fn output_types(&self) -> Option<&TypeSet> {
        self.output_types.as_ref()
    }

    async fn run(&self, meta: &Meta, _ctx: &ResolutionContext) -> Result<Vec<RawItem>> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail_runs.load(Ordering::SeqCst) {
            bail!("{} refused to list", self.id);
        }
        let path = meta.get("path").and_then(Value::as_str).unwrap_or_default();
        Ok(self.listings.get(path).cloned().unwrap_or_default())
    }

    fn icons(&self) -> Option<&dyn ProvidesIcon> {
        self.icon.as_ref().map(|_| self as &dyn ProvidesIcon)
    }
}

#[async_trait]
impl ProvidesIcon for ScriptedProvider {
    async fn icon(&self, _meta: &Meta) -> Result<Bytes> {
        self.icon_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_icons.load(Ordering::SeqCst) {
            bail!("icon source unavailable");
        }
        match &self.icon {
            Some(bytes) => Ok(bytes.clone()),
            None => bail!("no icon"),
        }
    }
}

/// Action recording the objects it was run with.
pub struct RecordingAction {
    spec: ActionSpec,
    icon: Option<Bytes>,
    pub calls: Mutex<Vec<(String, Option<String>)>>,
    pub fail: AtomicBool,
}

impl RecordingAction {
    pub fn new(spec: ActionSpec) -> Self {
        Self {
            spec,
            icon: None,
            calls: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn with_icon(mut self, icon: &'static [u8]) -> Self {
        self.icon = Some(Bytes::from_static(icon));
        self
    }

    /// `(direct name, indirect name)` for each run, in order.
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Action for RecordingAction {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn run(&self, direct: &Item, indirect: Option<&Item>) -> Result<ActionOutcome> {
        self.calls
            .lock()
            .push((direct.name.clone(), indirect.map(|item| item.name.clone())));
        if self.fail.load(Ordering::SeqCst) {
            bail!("handler exploded");
        }
        Ok(ActionOutcome::with_message(format!("ran {}", self.spec.name)))
    }

    fn icon(&self) -> Option<&dyn ActionIcon> {
        self.icon.as_ref().map(|_| self as &dyn ActionIcon)
    }
}

#[async_trait]
impl ActionIcon for RecordingAction {
    async fn icon(&self) -> Result<Bytes> {
        match &self.icon {
            Some(bytes) => Ok(bytes.clone()),
            None => bail!("no icon"),
        }
    }
}

/// Fallback icon directory with recognizable contents.
pub fn fallback_assets() -> Result<(TempDir, IconAssets)> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join(ygg::icon::MISSING_ICON_FILE), MISSING_ICON)?;
    std::fs::write(dir.path().join(ygg::icon::ACTION_ICON_FILE), ACTION_ICON)?;
    let assets = IconAssets::from_dir(dir.path());
    Ok((dir, assets))
}

/// Context with the catalog meta-providers (given presets) followed by
/// `providers` and `actions`, in order.
pub fn context_with(
    presets: Vec<Preset>,
    providers: &[Arc<ScriptedProvider>],
    actions: &[Arc<RecordingAction>],
    assets: IconAssets,
) -> ResolutionContext {
    let mut builder = CapabilityRegistry::builder().plugin(&CorePlugin::new(presets));
    for provider in providers {
        builder = builder.provider(Arc::clone(provider) as Arc<dyn Provider>);
    }
    for action in actions {
        builder = builder.action(Arc::clone(action) as Arc<dyn Action>);
    }
    ResolutionContext::with_assets(builder.build().expect("registry builds"), assets)
}
