//! CLI for apkdl: one app name in, one JSON line out.

use anyhow::Result;
use apkdl_core::config::{self, ApkdlConfig};
use apkdl_core::http::CurlTransport;
use apkdl_core::progress::ProgressLogger;
use apkdl_core::query::GoogleTranslator;
use apkdl_core::report::error_json;
use apkdl_core::{FailureKind, Orchestrator, ResolutionResult};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Resolve an application name to a downloaded Android package.
#[derive(Debug, Parser)]
#[command(name = "apkdl")]
#[command(about = "apkdl: find an app by name and download its package", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config dir.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory packages are written to (overrides `downloads_dir` in the config).
    #[arg(long, value_name = "DIR")]
    pub downloads_dir: Option<PathBuf>,

    /// Application name; multiple words are joined with spaces.
    #[arg(value_name = "NAME", trailing_var_arg = true, allow_hyphen_values = true)]
    pub name: Vec<String>,
}

impl Cli {
    pub fn query(&self) -> String {
        self.name.join(" ").trim().to_string()
    }
}

/// Parses argv, runs one request and prints its JSON line. Returns the process exit code.
pub fn run_from_args() -> i32 {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> i32 {
    let query = cli.query();
    let line = resolve(&cli, &query).and_then(|result| Ok(result.to_json()?));
    match line {
        Ok(line) => {
            println!("{}", line);
            0
        }
        Err(err) => {
            tracing::error!("fatal error: {:#}", err);
            match error_json(&format!("Script error: {:#}", err)) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::error!("failed to encode error report: {}", e),
            }
            1
        }
    }
}

fn resolve(cli: &Cli, query: &str) -> Result<ResolutionResult> {
    if query.is_empty() {
        return Ok(ResolutionResult::failure(FailureKind::NoQuery, query));
    }

    let cfg = load_config(cli.config.as_deref())?;
    let downloads_dir = cli
        .downloads_dir
        .clone()
        .unwrap_or_else(|| cfg.downloads_dir.clone());

    let transport = CurlTransport::new(cfg.timeouts.connect(), Some(cfg.chunk_size_bytes));
    let translator = GoogleTranslator::new(&transport, &cfg);
    let orchestrator = Orchestrator::new(&cfg, &transport, &translator, downloads_dir);

    let mut progress = ProgressLogger::new();
    orchestrator.resolve(query, &mut |p| {
        progress.observe(p);
    })
}

/// An explicit `--config` must load; the default location falls back to built-in defaults.
fn load_config(explicit: Option<&Path>) -> Result<ApkdlConfig> {
    if let Some(path) = explicit {
        return config::load_from(path);
    }
    match config::load_or_init() {
        Ok(cfg) => Ok(cfg),
        Err(err) => {
            tracing::warn!("using default config: {:#}", err);
            Ok(ApkdlConfig::default())
        }
    }
}
