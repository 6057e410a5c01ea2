//! Package fetcher: stream the binary to disk, classify it and size it.

use crate::config::ApkdlConfig;
use crate::http::{BodySink, RequestSpec, ResponseHead, StallGuard, Transport, TransportError};
use crate::outcome::{found_or_return, Outcome};
use crate::package::{package_file_name, size_label, PackageKind, PackageMetadata};
use crate::progress::Progress;
use crate::resolver::ResolvedPackage;
use crate::storage::PackageWriter;
use anyhow::Result;
use std::io;
use std::path::Path;
use std::time::Instant;

/// Body sink that opens the destination once headers are known, then writes
/// each chunk as it arrives.
struct DownloadSink<'p> {
    dir: &'p Path,
    title: &'p str,
    url: &'p str,
    kind: PackageKind,
    writer: Option<PackageWriter>,
    /// Advertised length, if any (zero counts as absent).
    total: Option<u64>,
    started: Option<Instant>,
    on_progress: &'p mut dyn FnMut(&Progress),
}

impl BodySink for DownloadSink<'_> {
    fn on_head(&mut self, head: &ResponseHead) -> io::Result<()> {
        self.kind = PackageKind::classify(head.content_disposition.as_deref(), self.url);
        let file_name = package_file_name(self.title, self.kind);
        self.writer = Some(PackageWriter::create(&self.dir.join(file_name))?);
        self.total = head.content_length.filter(|n| *n > 0);
        self.started = Some(Instant::now());
        Ok(())
    }

    fn on_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "body chunk before headers"))?;
        writer.write_chunk(chunk)?;
        if let Some(total) = self.total {
            let progress = Progress {
                bytes_done: writer.written(),
                total_bytes: total,
                elapsed: self.started.map(|s| s.elapsed()).unwrap_or_default(),
            };
            (self.on_progress)(&progress);
        }
        Ok(())
    }
}

pub struct PackageFetcher<'a> {
    cfg: &'a ApkdlConfig,
    transport: &'a dyn Transport,
}

impl<'a> PackageFetcher<'a> {
    pub fn new(cfg: &'a ApkdlConfig, transport: &'a dyn Transport) -> Self {
        Self { cfg, transport }
    }

    /// Streams `resolved.binary_url` into `downloads_dir`. Transport and disk
    /// failures are soft; nothing is left under the final file name on failure.
    ///
    /// A transfer is only cut short when it stalls or hits the overall cap,
    /// never because a large package is merely slow.
    pub fn fetch(
        &self,
        resolved: &ResolvedPackage,
        downloads_dir: &Path,
        on_progress: &mut dyn FnMut(&Progress),
    ) -> Result<Outcome<PackageMetadata>> {
        let req = RequestSpec::browser(
            resolved.binary_url.as_str(),
            self.cfg,
            &self.cfg.page_accept_language,
            self.cfg.timeouts.download(),
        )
        .stall_guard(StallGuard {
            min_bytes_per_sec: self.cfg.timeouts.stall_min_bytes_per_sec,
            window: self.cfg.timeouts.stall(),
        });
        let mut sink = DownloadSink {
            dir: downloads_dir,
            title: &resolved.title,
            url: &resolved.binary_url,
            kind: PackageKind::Apk,
            writer: None,
            total: None,
            started: None,
            on_progress,
        };

        tracing::info!("downloading {} from {}", resolved.title, resolved.binary_url);
        let head = match self.transport.stream(&req, &mut sink) {
            Ok(head) => head,
            Err(e) => return Ok(Outcome::Soft(e.into())),
        };

        let kind = sink.kind;
        let writer = found_or_return!(Outcome::from_option(sink.writer.take(), "response body"));
        let done = match writer.finalize() {
            Ok(done) => done,
            Err(e) => return Ok(Outcome::Soft(TransportError::Storage(e).into())),
        };

        let size_bytes = if done.bytes > 0 {
            done.bytes
        } else {
            head.content_length.unwrap_or(0)
        };
        let file_name = package_file_name(&resolved.title, kind);
        tracing::info!(
            "file downloaded: {} ({}, {}, sha256 {})",
            done.path.display(),
            size_label(size_bytes),
            kind,
            done.sha256
        );

        Ok(Outcome::Found(PackageMetadata {
            title: resolved.title.clone(),
            version: resolved.version.clone(),
            developer: resolved.developer.clone(),
            icon_url: resolved.icon_url.clone(),
            file_name,
            file_kind: kind,
            has_expansion_data: kind.has_expansion_data(),
            size_bytes,
            size_label: size_label(size_bytes),
            path: done.path,
            sha256: done.sha256,
        }))
    }
}
