//! Line-level browsing of plain-text files.

use super::{meta_path, tags};
use crate::capability::{Action, ActionOutcome, Provider};
use crate::catalog::identity::{TypeSet, types};
use crate::catalog::model::{ActionSpec, Item, Meta, RawItem};
use crate::catalog::registry::Plugin;
use crate::context::ResolutionContext;
use crate::runtime::first_on_path;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub const PLAIN_TEXT_PROVIDER_ID: &str = "plainTextProvider";

/// Clipboard writers in preference order, with the arguments that make them
/// read the new contents from stdin.
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// One child per non-blank line of the file at `meta.path`.
pub struct PlainTextProvider {
    input_types: TypeSet,
}

impl Default for PlainTextProvider {
    fn default() -> Self {
        Self {
            input_types: types([tags::PLAIN_TEXT]),
        }
    }
}

#[async_trait]
impl Provider for PlainTextProvider {
    fn id(&self) -> &str {
        PLAIN_TEXT_PROVIDER_ID
    }

    fn input_types(&self) -> &TypeSet {
        &self.input_types
    }

    async fn run(&self, meta: &Meta, _ctx: &ResolutionContext) -> Result<Vec<RawItem>> {
        let path = meta_path(meta)?;
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let path = path.to_string_lossy();

        Ok(contents
            .split('\n')
            .enumerate()
            .map(|(index, line)| (index, line.strip_suffix('\r').unwrap_or(line)))
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                RawItem::new(line, types([tags::TEXT_LINE])).with_meta(json!({
                    "index": index,
                    "text": line,
                    "path": path,
                }))
            })
            .collect())
    }
}

/// Places a text line on the system clipboard.
pub struct CopyToClipboard {
    spec: ActionSpec,
}

impl Default for CopyToClipboard {
    fn default() -> Self {
        Self {
            spec: ActionSpec::new("Copy to Clipboard", types([tags::TEXT_LINE])),
        }
    }
}

#[async_trait]
impl Action for CopyToClipboard {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn run(&self, direct: &Item, _indirect: Option<&Item>) -> Result<ActionOutcome> {
        let text = direct
            .meta
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or(&direct.name);

        let names: Vec<&str> = CLIPBOARD_TOOLS.iter().map(|(name, _)| *name).collect();
        let (name, binary) =
            first_on_path(&names).ok_or_else(|| anyhow!("no clipboard tool found on PATH"))?;
        let args = CLIPBOARD_TOOLS
            .iter()
            .find(|(tool, _)| *tool == name)
            .map(|(_, args)| *args)
            .unwrap_or_default();

        let mut child = Command::new(&binary)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to execute {}", binary.display()))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .with_context(|| format!("writing to {name}"))?;
        }
        let status = child.wait().await.with_context(|| format!("waiting for {name}"))?;
        if !status.success() {
            bail!("{name} returned non-zero exit code {}", status.code().unwrap_or(-1));
        }
        Ok(ActionOutcome::with_message(format!("copied {} characters", text.chars().count())))
    }
}

#[derive(Default)]
pub struct PlainTextPlugin;

impl Plugin for PlainTextPlugin {
    fn name(&self) -> &str {
        "plain-text"
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        vec![Arc::new(PlainTextProvider::default())]
    }

    fn actions(&self) -> Vec<Arc<dyn Action>> {
        vec![Arc::new(CopyToClipboard::default())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::registry::CapabilityRegistry;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn skips_blank_lines_but_keeps_original_indices() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "milk\n\n   \neggs\r\nbread")?;
        let ctx = ResolutionContext::new(CapabilityRegistry::builder().build()?);
        let meta = json!({"path": file.path().to_string_lossy()});

        let lines = PlainTextProvider::default().run(&meta, &ctx).await?;
        let names: Vec<_> = lines.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["milk", "eggs", "bread"]);
        assert_eq!(lines[1].meta["index"], 3);
        assert_eq!(lines[1].meta["text"], "eggs");
        assert_eq!(lines[2].meta["path"], meta["path"]);
        assert!(lines.iter().all(|item| item.types.contains(tags::TEXT_LINE)));
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_file_fails() {
        let ctx = ResolutionContext::new(CapabilityRegistry::builder().build().expect("registry"));
        let result = PlainTextProvider::default()
            .run(&json!({"path": "/no/such/file.txt"}), &ctx)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn copy_action_targets_text_lines() {
        let action = CopyToClipboard::default();
        assert_eq!(action.spec().name, "Copy to Clipboard");
        assert!(action.spec().direct_types.contains(tags::TEXT_LINE));
        assert!(action.spec().indirect_types.is_none());
    }
}
