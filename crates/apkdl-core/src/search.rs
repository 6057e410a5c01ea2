//! Catalog search: fetch the results listing and pick out candidate apps.
//!
//! The listing markup differs between page variants, so result blocks are
//! located with an ordered chain of selectors and the first non-empty one wins.

use crate::config::ApkdlConfig;
use crate::extract::{
    belongs_to_domain, element_text, first_match, non_empty_attr, resolve_url, selector,
};
use crate::http::{RequestSpec, Transport};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One search result eligible for a download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    /// Absolute address of the app's detail page.
    pub detail_url: String,
    pub title: String,
}

static FIRST_BLOCK: Lazy<Selector> = Lazy::new(|| selector("div.first"));
static FIRST_INFO_LINK: Lazy<Selector> = Lazy::new(|| selector("a.first-info"));
static SEARCH_DL: Lazy<Selector> = Lazy::new(|| selector("dl.search-dl"));
static SEARCH_RES: Lazy<Selector> = Lazy::new(|| selector("div#search-res"));
static SEARCH_RESULT: Lazy<Selector> = Lazy::new(|| selector("div.search-result"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static TITLE_P1: Lazy<Selector> = Lazy::new(|| selector("p.p1"));
static TITLE_DIV: Lazy<Selector> = Lazy::new(|| selector("div.title"));
static DOWNLOAD_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/.*/.*/download").expect("static regex must compile"));

type ResultStrategy = for<'d> fn(&'d Html) -> Option<Vec<ElementRef<'d>>>;

/// Result-block strategies, most specific markup first.
const RESULT_STRATEGIES: [ResultStrategy; 4] = [
    first_blocks,
    first_info_links,
    search_dl_blocks,
    container_download_links,
];

fn non_empty(found: Vec<ElementRef<'_>>) -> Option<Vec<ElementRef<'_>>> {
    (!found.is_empty()).then_some(found)
}

fn first_blocks(doc: &Html) -> Option<Vec<ElementRef<'_>>> {
    non_empty(doc.select(&FIRST_BLOCK).collect())
}

fn first_info_links(doc: &Html) -> Option<Vec<ElementRef<'_>>> {
    non_empty(doc.select(&FIRST_INFO_LINK).collect())
}

fn search_dl_blocks(doc: &Html) -> Option<Vec<ElementRef<'_>>> {
    non_empty(doc.select(&SEARCH_DL).collect())
}

/// Download-style links inside the generic results container.
fn container_download_links(doc: &Html) -> Option<Vec<ElementRef<'_>>> {
    let container = doc
        .select(&SEARCH_RES)
        .next()
        .or_else(|| doc.select(&SEARCH_RESULT).next())?;
    non_empty(
        container
            .select(&LINK)
            .filter(|a| {
                a.value()
                    .attr("href")
                    .map_or(false, |href| DOWNLOAD_PATH.is_match(href))
            })
            .collect(),
    )
}

/// Builds a candidate from one result block, or None if it has no usable
/// link, points off-catalog, or has no title.
fn candidate_from(item: ElementRef<'_>, base: &Url, domain: &str) -> Option<SearchCandidate> {
    let link = if item.value().name() == "a" {
        item
    } else {
        item.select(&LINK).next()?
    };
    let href = non_empty_attr(link, "href")?;
    let detail_url = resolve_url(base, href)?;
    if !belongs_to_domain(&detail_url, domain) {
        tracing::debug!("dropping off-catalog result {}", detail_url);
        return None;
    }

    let title = non_empty_attr(link, "title")
        .map(str::to_string)
        .or_else(|| {
            item.select(&TITLE_P1)
                .next()
                .or_else(|| item.select(&TITLE_DIV).next())
                .map(element_text)
                .filter(|t| !t.is_empty())
        })
        .or_else(|| Some(element_text(link)).filter(|t| !t.is_empty()))?;

    Some(SearchCandidate {
        detail_url: detail_url.to_string(),
        title,
    })
}

/// Extracts up to `cap` candidates from a search listing, in document order.
pub fn extract_candidates(html: &str, base: &Url, domain: &str, cap: usize) -> Vec<SearchCandidate> {
    let doc = Html::parse_document(html);
    let Some(items) = first_match(&doc, RESULT_STRATEGIES.iter()) else {
        return Vec::new();
    };
    items
        .into_iter()
        .take(cap)
        .filter_map(|item| candidate_from(item, base, domain))
        .collect()
}

pub struct SearchResolver<'a> {
    cfg: &'a ApkdlConfig,
    transport: &'a dyn Transport,
}

impl<'a> SearchResolver<'a> {
    pub fn new(cfg: &'a ApkdlConfig, transport: &'a dyn Transport) -> Self {
        Self { cfg, transport }
    }

    /// Catalog root; result links are resolved against it.
    fn base_url(&self) -> Result<Url> {
        Url::parse(&self.cfg.catalog_base_url)
            .with_context(|| format!("invalid catalog_base_url {}", self.cfg.catalog_base_url))
    }

    /// Search endpoint address for `query` (query-escaped).
    pub fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self
            .base_url()?
            .join(&self.cfg.search_path)
            .with_context(|| format!("invalid search_path {}", self.cfg.search_path))?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    /// Returns ranked candidates for `query`. Transport faults yield an empty
    /// list; only a broken configuration is an error.
    pub fn search(&self, query: &str) -> Result<Vec<SearchCandidate>> {
        let base = self.base_url()?;
        let url = self.search_url(query)?;
        let req = RequestSpec::browser(
            url.as_str(),
            self.cfg,
            &self.cfg.search_accept_language,
            self.cfg.timeouts.search(),
        );

        tracing::info!("searching catalog for '{}'", query);
        let html = match self.transport.get_page(&req) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("search request failed ({}): {}", e.kind(), e);
                return Ok(Vec::new());
            }
        };

        let candidates =
            extract_candidates(&html, &base, &self.cfg.catalog_domain, self.cfg.max_candidates);
        if candidates.is_empty() {
            tracing::info!("no search results found");
        }
        for c in &candidates {
            tracing::info!("found: {} - {}", c.title, c.detail_url);
        }
        Ok(candidates)
    }
}
