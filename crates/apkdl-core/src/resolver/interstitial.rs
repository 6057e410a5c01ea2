//! Interstitial download page: the link to the actual package binary.

use crate::extract::{element_text, first_attr, first_match, non_empty_attr, selector};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static DOWNLOAD_LINK_ID: Lazy<Selector> = Lazy::new(|| selector("a#download_link"));
static DOWNLOAD_CLICK: Lazy<Selector> = Lazy::new(|| selector("a.download-click"));
static DOWNLOAD_BUTTON_CLASS: Lazy<Selector> = Lazy::new(|| selector("a.downloadButton"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static PACKAGE_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(apk|xapk|apks)$").expect("static regex must compile"));

type LinkStrategy = fn(&Html) -> Option<String>;

const BINARY_LINK_STRATEGIES: [LinkStrategy; 4] = [
    download_link_id,
    download_click,
    download_button_class,
    package_extension_href,
];

fn download_link_id(doc: &Html) -> Option<String> {
    first_attr(doc, &DOWNLOAD_LINK_ID, "href")
}

fn download_click(doc: &Html) -> Option<String> {
    first_attr(doc, &DOWNLOAD_CLICK, "href")
}

fn download_button_class(doc: &Html) -> Option<String> {
    first_attr(doc, &DOWNLOAD_BUTTON_CLASS, "href")
}

fn package_extension_href(doc: &Html) -> Option<String> {
    doc.select(&ANCHOR).find_map(|a| {
        let href = non_empty_attr(a, "href")?;
        if PACKAGE_HREF.is_match(href) {
            tracing::debug!("matched package link '{}' by extension", element_text(a));
            Some(href.to_string())
        } else {
            None
        }
    })
}

/// Raw `href` of the package binary on an interstitial page.
pub fn find_binary_href(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    first_match(&doc, BINARY_LINK_STRATEGIES.iter())
}
