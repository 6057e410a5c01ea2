//! Helpers shared by the selector chains that scrape catalog pages.
//!
//! Each chain is an ordered list of plain functions over a parsed document;
//! [`first_match`] runs them in order and keeps the first hit.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Runs `strategies` in order against `doc`, returning the first `Some`.
pub fn first_match<'d, T, F>(doc: &'d Html, strategies: impl IntoIterator<Item = F>) -> Option<T>
where
    F: Fn(&'d Html) -> Option<T>,
{
    strategies.into_iter().find_map(|strategy| strategy(doc))
}

/// Parses a CSS selector known at compile time.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Visible text of an element with whitespace runs collapsed to single spaces.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Attribute value, if present and not blank.
pub fn non_empty_attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// First element matching `sel` whose `attr` is present and not blank.
pub fn first_attr(doc: &Html, sel: &Selector, attr: &str) -> Option<String> {
    doc.select(sel)
        .find_map(|el| non_empty_attr(el, attr))
        .map(str::to_string)
}

/// Resolves `href` against `base`; absolute addresses are returned as-is.
pub fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

/// True when `url`'s host is `domain` or one of its subdomains.
pub fn belongs_to_domain(url: &Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => {
            let host = host.to_ascii_lowercase();
            let domain = domain.to_ascii_lowercase();
            host == domain || host.ends_with(&format!(".{}", domain))
        }
        None => false,
    }
}
