//! Logging init: stderr always, plus a log file under the XDG state dir when writable.
//!
//! stdout is reserved for the single JSON result line, so no layer ever writes there.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,apkdl_core=debug,apkdl=debug";

/// Writer that is either the log file or a sink (used when file clone fails).
enum FileOrSink {
    File(fs::File),
    Sink,
}

impl io::Write for FileOrSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrSink::File(f) => f.write(buf),
            FileOrSink::Sink => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrSink::File(f) => f.flush(),
            FileOrSink::Sink => Ok(()),
        }
    }
}

struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrSink::File)
            .unwrap_or(FileOrSink::Sink)
    }
}

/// Opens `~/.local/state/apkdl/apkdl.log` for appending.
fn open_log_file() -> Result<(fs::File, PathBuf)> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("apkdl")?;
    let log_dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&log_dir)?;
    let log_file_path = log_dir.join("apkdl.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;
    Ok((file, log_file_path))
}

/// Initialize structured logging to stderr and, when possible, to the state-dir log file.
/// A missing or unwritable state dir only drops the file layer.
pub fn init_logging() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, log_path) = match open_log_file() {
        Ok((file, path)) => {
            let layer = fmt::layer()
                .with_writer(BoxMakeWriter::new(FileMakeWriter(file)))
                .with_ansi(false);
            (Some(layer), Some(path))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .with(file_layer)
        .try_init()?;

    if let Some(path) = log_path {
        tracing::debug!("apkdl logging initialized at {}", path.display());
    }
    Ok(())
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so the CLI doesn't crash.
pub fn init_logging_stderr() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
