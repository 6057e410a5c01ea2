//! Link resolution: detail page → interstitial download page → package binary.
//!
//! Each hop has its own extraction contract ([`detail`], [`interstitial`]) so
//! it can be checked against a recorded page of that shape. The resolver keeps
//! no state between calls.

pub mod detail;
pub mod interstitial;

use crate::config::ApkdlConfig;
use crate::extract::resolve_url;
use crate::http::{RequestSpec, Transport, TransportError};
use crate::outcome::{found_or_return, Outcome};
use crate::search::SearchCandidate;
use anyhow::{Context, Result};
use url::Url;

pub use detail::{parse_detail_page, DetailPage, LATEST_VERSION, UNKNOWN_DEVELOPER};
pub use interstitial::find_binary_href;

/// Everything needed to fetch one candidate's package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub title: String,
    pub version: String,
    pub developer: String,
    pub icon_url: Option<String>,
    /// Absolute address of the package binary.
    pub binary_url: String,
}

pub struct LinkResolver<'a> {
    cfg: &'a ApkdlConfig,
    transport: &'a dyn Transport,
}

impl<'a> LinkResolver<'a> {
    pub fn new(cfg: &'a ApkdlConfig, transport: &'a dyn Transport) -> Self {
        Self { cfg, transport }
    }

    fn base_url(&self) -> Result<Url> {
        Url::parse(&self.cfg.catalog_base_url)
            .with_context(|| format!("invalid catalog_base_url {}", self.cfg.catalog_base_url))
    }

    fn fetch_page(&self, url: &str) -> Result<String, TransportError> {
        let req = RequestSpec::browser(
            url,
            self.cfg,
            &self.cfg.page_accept_language,
            self.cfg.timeouts.page(),
        );
        self.transport.get_page(&req)
    }

    /// Hop 1: fetch the detail page, read its metadata and the download page address.
    pub fn visit_detail_page(&self, detail_url: &str) -> Result<Outcome<(DetailPage, Url)>> {
        let base = self.base_url()?;
        tracing::info!("getting app details from: {}", detail_url);
        let html = found_or_return!(Outcome::from(self.fetch_page(detail_url)));

        let page = parse_detail_page(&html, &base);
        let href = found_or_return!(Outcome::from_option(
            page.download_href.clone(),
            "download link"
        ));
        let download_page = found_or_return!(Outcome::from_option(
            resolve_url(&base, &href),
            "valid download page address"
        ));
        Ok(Outcome::Found((page, download_page)))
    }

    /// Hop 2: fetch the interstitial page and read the package binary address.
    pub fn visit_interstitial(&self, download_page: &Url) -> Result<Outcome<Url>> {
        let base = self.base_url()?;
        tracing::info!("getting download link from: {}", download_page);
        let html = found_or_return!(Outcome::from(self.fetch_page(download_page.as_str())));

        let href = found_or_return!(Outcome::from_option(
            find_binary_href(&html),
            "direct download link"
        ));
        let binary = found_or_return!(Outcome::from_option(
            resolve_url(&base, &href),
            "valid direct download address"
        ));
        tracing::info!("download URL: {}", binary);
        Ok(Outcome::Found(binary))
    }

    /// Runs both hops for one candidate.
    pub fn resolve(&self, candidate: &SearchCandidate) -> Result<Outcome<ResolvedPackage>> {
        let (page, download_page) = found_or_return!(self.visit_detail_page(&candidate.detail_url)?);
        let binary = found_or_return!(self.visit_interstitial(&download_page)?);

        Ok(Outcome::Found(ResolvedPackage {
            title: candidate.title.clone(),
            version: page.version,
            developer: page.developer,
            icon_url: page.icon_url,
            binary_url: binary.to_string(),
        }))
    }
}
