//! Validates the engine configuration and prints the resolved presets.

use anyhow::{Result, anyhow, bail};
use serde_json::json;
use std::{env, path::PathBuf};
use ygg::{EngineConfig, find_root};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config_path = parse_args()?;
    let root = find_root().ok();
    let config = EngineConfig::discover(config_path.as_deref(), root.as_deref())?;

    let summary = json!({
        "schema_version": config.schema_version,
        "assets_dir": config.assets_dir(root.as_deref()),
        "presets": config.presets,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn parse_args() -> Result<Option<PathBuf>> {
    let mut args = env::args_os();
    let _program = args.next();
    let mut config_path = None;

    while let Some(arg) = args.next() {
        let arg_str = arg
            .to_str()
            .ok_or_else(|| anyhow!("invalid UTF-8 in argument"))?;
        match arg_str {
            "--config" => {
                let value = args
                    .next()
                    .and_then(|value| value.into_string().ok())
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| anyhow!("--config requires a path"))?;
                config_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: ygg-config [--config PATH]\n\nValidates the engine config (explicit path, YGG_CONFIG, or <root>/config/ygg.json) and prints its presets."
                );
                std::process::exit(0);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(config_path)
}
