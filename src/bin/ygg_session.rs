//! Serves engine requests over stdin/stdout as NDJSON.
//!
//! Each input line is one request (`{"op": "children", "id": "default"}`);
//! each output line is the matching response. Logs go to stderr, filtered by
//! `YGG_LOG`.

use anyhow::{Context, Result, anyhow, bail};
use std::{env, path::PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use ygg::session::handle_line;
use ygg::{Engine, EngineConfig, find_root, logging};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse()?;
    logging::init();

    let root = find_root().ok();
    let config = EngineConfig::discover(cli.config_path.as_deref(), root.as_deref())?;
    let engine = Engine::from_config(&config, root.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(serve(&engine, cli.prime))
}

async fn serve(engine: &Engine, prime: bool) -> Result<()> {
    if prime {
        engine.prime().await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await.context("reading request")? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(engine, &line).await;
        let mut encoded = serde_json::to_vec(&response).context("encoding response")?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await.context("writing response")?;
        stdout.flush().await.context("writing response")?;
    }
    Ok(())
}

struct Cli {
    config_path: Option<PathBuf>,
    prime: bool,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os();
        let _program = args.next();
        let mut config_path = None;
        let mut prime = false;

        while let Some(arg) = args.next() {
            let arg_str = arg
                .to_str()
                .ok_or_else(|| anyhow!("invalid UTF-8 in argument"))?;
            match arg_str {
                "--config" => config_path = Some(next_path("--config", &mut args)?),
                "--prime" => prime = true,
                "--help" | "-h" => usage(0),
                other => bail!("unknown argument: {other}"),
            }
        }

        Ok(Self { config_path, prime })
    }
}

fn next_path(flag: &str, args: &mut env::ArgsOs) -> Result<PathBuf> {
    let value = args
        .next()
        .ok_or_else(|| anyhow!("{flag} requires a value"))?;
    let path = PathBuf::from(
        value
            .into_string()
            .map_err(|_| anyhow!("{flag} must be valid UTF-8"))?,
    );
    if path.as_os_str().is_empty() {
        bail!("{flag} must not be empty");
    }
    Ok(path)
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: ygg-session [--config PATH] [--prime]\n\nReads one JSON request per line on stdin and writes one JSON response per line.\n\nOptions:\n  --config PATH             Engine config file (or set YGG_CONFIG).\n  --prime                   Expand both catalogs before reading requests.\n  --help                    Show this help text."
    );
    std::process::exit(code);
}
