//! Progress observations for a package stream.
//!
//! Emitted once per received chunk, and only when the server advertised a
//! `Content-Length`; without it completion cannot be computed.

use std::time::Duration;

/// Snapshot of download progress (CLI-friendly).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Bytes written so far.
    pub bytes_done: u64,
    /// Advertised total size in bytes (never zero).
    pub total_bytes: u64,
    /// Time since the first chunk arrived.
    pub elapsed: Duration,
}

impl Progress {
    /// Percentage complete in [0.0, 100.0].
    pub fn percent(&self) -> f64 {
        (self.bytes_done as f64 / self.total_bytes as f64 * 100.0).min(100.0)
    }

    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / secs
    }
}

/// Logs a progress line each time the whole-number percentage changes.
#[derive(Debug, Default)]
pub struct ProgressLogger {
    last_percent: Option<u32>,
}

impl ProgressLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a line was logged for `p`.
    pub fn observe(&mut self, p: &Progress) -> bool {
        let pct = p.percent().floor() as u32;
        if self.last_percent == Some(pct) {
            return false;
        }
        self.last_percent = Some(pct);
        tracing::debug!(
            "progress: {:.1}% ({} / {} bytes, {:.0} KiB/s)",
            p.percent(),
            p.bytes_done,
            p.total_bytes,
            p.bytes_per_sec() / 1024.0
        );
        true
    }
}
