//! Folder listing provider and the file actions that go with it.
//!
//! Content types are derived from the entry kind and extension. The lowercase
//! extension itself is appended as a tag so presets and actions can match on
//! it directly.

use super::{abbreviate_home, meta_path, tags};
use crate::capability::{Action, ActionOutcome, Provider, ProvidesIcon, SynthesizesProviderItem};
use crate::catalog::identity::{TypeSet, types};
use crate::catalog::model::{ActionSpec, Item, Meta, RawItem};
use crate::catalog::registry::Plugin;
use crate::context::ResolutionContext;
use crate::runtime::find_on_path;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

pub const FOLDER_PROVIDER_ID: &str = "folderProvider";

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "ico", "icns",
];
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "md", "markdown", "log", "csv", "conf", "ini",
];

/// Lists the entries of a folder (or application bundle) given `meta.path`.
///
/// Expands anything tagged as a folder or directory. Application bundles are
/// directories and stay browsable; `.desktop` entries are plain files and
/// carry no directory tag.
pub struct FolderProvider {
    input_types: TypeSet,
    output_types: TypeSet,
}

impl Default for FolderProvider {
    fn default() -> Self {
        Self {
            input_types: types([tags::FOLDER, tags::DIRECTORY]),
            output_types: types([tags::IMAGE]),
        }
    }
}

#[async_trait]
impl Provider for FolderProvider {
    fn id(&self) -> &str {
        FOLDER_PROVIDER_ID
    }

    fn input_types(&self) -> &TypeSet {
        &self.input_types
    }

    fn output_types(&self) -> Option<&TypeSet> {
        Some(&self.output_types)
    }

    async fn run(&self, meta: &Meta, _ctx: &ResolutionContext) -> Result<Vec<RawItem>> {
        let dir = meta_path(meta)?;
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("listing {}", dir.display()))?;

        let mut items = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("listing {}", dir.display()))?
        {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata.is_dir(),
                Err(err) => {
                    debug!(
                        path = %path.display(),
                        error = %err,
                        "unreadable entry; typing as plain item"
                    );
                    false
                }
            };
            items.push(
                RawItem::new(name, content_types(&path, is_dir))
                    .with_detail(abbreviate_home(&path))
                    .with_meta(json!({ "path": path.to_string_lossy() })),
            );
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn icons(&self) -> Option<&dyn ProvidesIcon> {
        Some(self)
    }

    fn provider_items(&self) -> Option<&dyn SynthesizesProviderItem> {
        Some(self)
    }
}

#[async_trait]
impl ProvidesIcon for FolderProvider {
    /// Image files are their own icon.
    async fn icon(&self, meta: &Meta) -> Result<Bytes> {
        let path = meta_path(meta)?;
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading image {}", path.display()))?;
        Ok(Bytes::from(bytes))
    }
}

#[async_trait]
impl SynthesizesProviderItem for FolderProvider {
    async fn make_provider_item(&self, meta: &Meta) -> Result<RawItem> {
        let path = meta_path(meta)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(RawItem::new(name, types([tags::FOLDER, tags::ITEM]))
            .with_detail(abbreviate_home(&path))
            .with_meta(meta.clone()))
    }
}

/// Type tags for a directory entry, most specific first.
pub fn content_types(path: &Path, is_dir: bool) -> TypeSet {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let mut set = TypeSet::new();
    match (is_dir, extension.as_str()) {
        (true, "app") => {
            set.insert(tags::APPLICATION);
            set.insert(tags::DIRECTORY);
        }
        (true, _) => {
            set.insert(tags::FOLDER);
            set.insert(tags::DIRECTORY);
        }
        (false, "desktop") => {
            set.insert(tags::APPLICATION);
            set.insert(tags::DATA);
        }
        (false, ext) if IMAGE_EXTENSIONS.contains(&ext) => {
            set.insert(tags::IMAGE);
            set.insert(tags::DATA);
        }
        (false, ext) if TEXT_EXTENSIONS.contains(&ext) => {
            set.insert(tags::PLAIN_TEXT);
            set.insert(tags::TEXT);
            set.insert(tags::DATA);
        }
        (false, _) => set.insert(tags::DATA),
    }
    set.insert(tags::ITEM);
    if !extension.is_empty() {
        set.insert(&extension);
    }
    set
}

/// Which file action a [`FileAction`] performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileOp {
    Open,
    Reveal,
    Print,
    OpenWith,
}

pub struct FileAction {
    op: FileOp,
    spec: ActionSpec,
}

impl FileAction {
    fn new(op: FileOp) -> Self {
        let spec = match op {
            FileOp::Open => ActionSpec::new("Open", types([tags::ITEM])),
            FileOp::Reveal => ActionSpec::new("Reveal", types([tags::ITEM])),
            FileOp::Print => ActionSpec::new("Print", types([tags::IMAGE])),
            FileOp::OpenWith => ActionSpec::new("Open With", types([tags::ITEM]))
                .with_indirect_types(types([tags::APPLICATION])),
        };
        Self { op, spec }
    }

    pub fn open() -> Self {
        Self::new(FileOp::Open)
    }

    pub fn reveal() -> Self {
        Self::new(FileOp::Reveal)
    }

    pub fn print() -> Self {
        Self::new(FileOp::Print)
    }

    pub fn open_with() -> Self {
        Self::new(FileOp::OpenWith)
    }
}

#[async_trait]
impl Action for FileAction {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn run(&self, direct: &Item, indirect: Option<&Item>) -> Result<ActionOutcome> {
        let path = meta_path(&direct.meta)?;
        let target = path.to_string_lossy().into_owned();
        match self.op {
            FileOp::Open => {
                launch(opener(), &[target.as_str()]).await?;
                Ok(ActionOutcome::with_message(format!("opened {}", direct.name)))
            }
            FileOp::Reveal => {
                if cfg!(target_os = "macos") {
                    launch("open", &["-R", target.as_str()]).await?;
                } else {
                    let parent = path.parent().unwrap_or(&path).to_string_lossy().into_owned();
                    launch(opener(), &[parent.as_str()]).await?;
                }
                Ok(ActionOutcome::with_message(format!("revealed {}", direct.name)))
            }
            FileOp::Print => {
                info!(name = %direct.name, path = %target, "print requested");
                Ok(ActionOutcome::with_message(format!("Print {}", direct.name)))
            }
            FileOp::OpenWith => {
                let app = indirect.ok_or_else(|| anyhow!("Open With needs an application"))?;
                let app_path = meta_path(&app.meta)?.to_string_lossy().into_owned();
                if cfg!(target_os = "macos") {
                    launch("open", &["-a", app_path.as_str(), target.as_str()]).await?;
                } else {
                    launch("gio", &["launch", app_path.as_str(), target.as_str()]).await?;
                }
                Ok(ActionOutcome::with_message(format!(
                    "opened {} with {}",
                    direct.name, app.name
                )))
            }
        }
    }
}

fn opener() -> &'static str {
    if cfg!(target_os = "macos") { "open" } else { "xdg-open" }
}

async fn launch(program: &str, args: &[&str]) -> Result<()> {
    let binary = find_on_path(program).ok_or_else(|| anyhow!("{program} not found on PATH"))?;
    debug!(program, ?args, "launching");
    let status = Command::new(&binary)
        .args(args)
        .status()
        .await
        .with_context(|| format!("Failed to execute {}", binary.display()))?;
    if !status.success() {
        let code = status.code().unwrap_or(-1);
        bail!("{program} returned non-zero exit code {code}");
    }
    Ok(())
}

/// Folder provider plus Open, Reveal, Print and Open With.
#[derive(Default)]
pub struct FileSystemPlugin;

impl Plugin for FileSystemPlugin {
    fn name(&self) -> &str {
        "file-system"
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        vec![Arc::new(FolderProvider::default())]
    }

    fn actions(&self) -> Vec<Arc<dyn Action>> {
        vec![
            Arc::new(FileAction::open()),
            Arc::new(FileAction::reveal()),
            Arc::new(FileAction::print()),
            Arc::new(FileAction::open_with()),
        ]
    }
}
