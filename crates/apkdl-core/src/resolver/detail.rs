//! Detail page: presentational metadata and the link to the download page.

use crate::extract::{element_text, first_attr, first_match, non_empty_attr, resolve_url, selector};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Version shown when the page does not expose one.
pub const LATEST_VERSION: &str = "Latest";
/// Developer shown when the page does not expose one.
pub const UNKNOWN_DEVELOPER: &str = "Unknown";

static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image"]"#));
static ITEMPROP_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"img[itemprop="image"]"#));
static ICON_DIV: Lazy<Selector> = Lazy::new(|| selector("div.icon"));
static APP_ICON_DIV: Lazy<Selector> = Lazy::new(|| selector("div.app-icon"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static ICON_IMG: Lazy<Selector> = Lazy::new(|| selector("img.icon"));
static VERSION_SPAN: Lazy<Selector> = Lazy::new(|| selector("span.version"));
static VER_DIV: Lazy<Selector> = Lazy::new(|| selector("div.ver"));
static AUTHOR_LINK: Lazy<Selector> = Lazy::new(|| selector(r#"a[itemprop="author"]"#));
static AUTHOR_P: Lazy<Selector> = Lazy::new(|| selector("p.author"));
static DOWNLOAD_BTN: Lazy<Selector> = Lazy::new(|| selector("a.download-btn"));
static DA_LINK: Lazy<Selector> = Lazy::new(|| selector("a.da"));
static DOWNLOAD_BUTTON_ID: Lazy<Selector> = Lazy::new(|| selector("a#download_button"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

static DOWNLOAD_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Download.*APK").expect("static regex must compile"));
static THUMB_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/w/\d+").expect("static regex must compile"));
static THUMB_QUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"=w\d+").expect("static regex must compile"));

type FieldStrategy = fn(&Html) -> Option<String>;

const ICON_STRATEGIES: [FieldStrategy; 4] = [
    og_image,
    itemprop_image,
    icon_container_image,
    classed_icon_image,
];
const VERSION_STRATEGIES: [FieldStrategy; 2] = [version_span, ver_div];
const DEVELOPER_STRATEGIES: [FieldStrategy; 2] = [author_link, author_paragraph];
const DOWNLOAD_LINK_STRATEGIES: [FieldStrategy; 4] = [
    download_btn_link,
    da_link,
    download_button_id_link,
    download_apk_text_link,
];

fn og_image(doc: &Html) -> Option<String> {
    first_attr(doc, &OG_IMAGE, "content")
}

fn itemprop_image(doc: &Html) -> Option<String> {
    first_attr(doc, &ITEMPROP_IMAGE, "src")
}

fn icon_container_image(doc: &Html) -> Option<String> {
    let container = doc
        .select(&ICON_DIV)
        .next()
        .or_else(|| doc.select(&APP_ICON_DIV).next())?;
    let img = container.select(&IMG).next()?;
    non_empty_attr(img, "src").map(str::to_string)
}

fn classed_icon_image(doc: &Html) -> Option<String> {
    first_attr(doc, &ICON_IMG, "src")
}

fn first_text(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn version_span(doc: &Html) -> Option<String> {
    first_text(doc, &VERSION_SPAN).and_then(strip_version_label)
}

fn ver_div(doc: &Html) -> Option<String> {
    first_text(doc, &VER_DIV).and_then(strip_version_label)
}

fn strip_version_label(text: String) -> Option<String> {
    let v = text.replace("Version:", "");
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn author_link(doc: &Html) -> Option<String> {
    first_text(doc, &AUTHOR_LINK)
}

fn author_paragraph(doc: &Html) -> Option<String> {
    first_text(doc, &AUTHOR_P)
}

fn download_btn_link(doc: &Html) -> Option<String> {
    first_attr(doc, &DOWNLOAD_BTN, "href")
}

fn da_link(doc: &Html) -> Option<String> {
    first_attr(doc, &DA_LINK, "href")
}

fn download_button_id_link(doc: &Html) -> Option<String> {
    first_attr(doc, &DOWNLOAD_BUTTON_ID, "href")
}

fn download_apk_text_link(doc: &Html) -> Option<String> {
    doc.select(&ANCHOR)
        .filter(|a| DOWNLOAD_TEXT.is_match(&element_text(*a)))
        .find_map(|a| non_empty_attr(a, "href"))
        .map(str::to_string)
}

/// Strips thumbnail sizing (`/w/<n>` and `=w<n>`) and makes the address absolute.
pub fn normalize_icon_url(raw: &str, base: &Url) -> Option<String> {
    let stripped = THUMB_PATH.replace_all(raw.trim(), "");
    let stripped = THUMB_QUERY.replace_all(&stripped, "");
    if stripped.starts_with("http") {
        return Some(stripped.into_owned());
    }
    resolve_url(base, &stripped).map(|u| u.to_string())
}

/// What the detail page yields. Missing fields keep their sentinel defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub icon_url: Option<String>,
    pub version: String,
    pub developer: String,
    /// Raw `href` of the link to the download (interstitial) page.
    pub download_href: Option<String>,
}

pub fn parse_detail_page(html: &str, base: &Url) -> DetailPage {
    let doc = Html::parse_document(html);
    DetailPage {
        icon_url: first_match(&doc, ICON_STRATEGIES.iter())
            .and_then(|raw| normalize_icon_url(&raw, base)),
        version: first_match(&doc, VERSION_STRATEGIES.iter())
            .unwrap_or_else(|| LATEST_VERSION.to_string()),
        developer: first_match(&doc, DEVELOPER_STRATEGIES.iter())
            .unwrap_or_else(|| UNKNOWN_DEVELOPER.to_string()),
        download_href: first_match(&doc, DOWNLOAD_LINK_STRATEGIES.iter()),
    }
}
