//! HTTP transport seam.
//!
//! Every network call in the pipeline goes through [`Transport`], so each
//! stage can be driven against recorded pages in tests. [`CurlTransport`] is
//! the blocking libcurl implementation used in production.

mod curl_transport;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod parse;

pub use curl_transport::CurlTransport;
pub use error::{classify_curl_error, FaultKind, TransportError};

use crate::config::ApkdlConfig;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Abort a transfer that stays below `min_bytes_per_sec` for `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StallGuard {
    pub min_bytes_per_sec: u32,
    pub window: Duration,
}

/// One GET request: address, headers and total timeout.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub url: String,
    pub headers: HashMap<String, String>,
    /// Overall deadline for the whole transfer.
    pub timeout: Duration,
    pub stall: Option<StallGuard>,
}

impl RequestSpec {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout,
            stall: None,
        }
    }

    /// Request carrying the catalog's browser identity and the given Accept-Language.
    pub fn browser(
        url: impl Into<String>,
        cfg: &ApkdlConfig,
        accept_language: &str,
        timeout: Duration,
    ) -> Self {
        Self::new(url, timeout)
            .header("User-Agent", &cfg.user_agent)
            .header("Accept", ACCEPT_HTML)
            .header("Accept-Language", accept_language)
            .header("Referer", &format!("{}/", cfg.catalog_base_url.trim_end_matches('/')))
    }

    pub fn stall_guard(mut self, guard: StallGuard) -> Self {
        self.stall = Some(guard);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

/// Headers of the final response (after redirects).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: Option<u32>,
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// `Content-Disposition` value if present (filename hint).
    pub content_disposition: Option<String>,
    pub content_type: Option<String>,
}

/// Consumer of a streamed response body.
///
/// `on_head` is called exactly once, before the first chunk (or after the
/// transfer when the body is empty). Returning an error aborts the transfer.
pub trait BodySink {
    fn on_head(&mut self, head: &ResponseHead) -> io::Result<()>;
    fn on_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;
}

/// Blocking HTTP GET operations used by the pipeline.
pub trait Transport {
    /// Fetches a whole (small) document as text. Non-2xx is an error.
    fn get_page(&self, req: &RequestSpec) -> Result<String, TransportError>;

    /// Streams a body chunk by chunk into `sink`. Non-2xx is an error and no
    /// chunk of an error body reaches the sink.
    fn stream(
        &self,
        req: &RequestSpec,
        sink: &mut dyn BodySink,
    ) -> Result<ResponseHead, TransportError>;
}
