//! Client for the public Google Translate `translate_a/single` endpoint.

use super::Translator;
use crate::config::ApkdlConfig;
use crate::http::{RequestSpec, Transport};
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub struct GoogleTranslator<'a> {
    transport: &'a dyn Transport,
    endpoint: String,
    user_agent: String,
    timeout: Duration,
}

impl<'a> GoogleTranslator<'a> {
    pub fn new(transport: &'a dyn Transport, cfg: &ApkdlConfig) -> Self {
        Self {
            transport,
            endpoint: cfg.translation.endpoint.clone(),
            user_agent: cfg.user_agent.clone(),
            timeout: cfg.timeouts.translate(),
        }
    }

    fn request_url(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .with_context(|| format!("invalid translation endpoint {}", self.endpoint))?;
        url.query_pairs_mut()
            .append_pair("client", "gtx")
            .append_pair("sl", source_lang)
            .append_pair("tl", target_lang)
            .append_pair("dt", "t")
            .append_pair("q", text);
        Ok(url)
    }
}

impl Translator for GoogleTranslator<'_> {
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let url = self.request_url(text, source_lang, target_lang)?;
        let req = RequestSpec::new(url.as_str(), self.timeout).header("User-Agent", &self.user_agent);
        let body = self
            .transport
            .get_page(&req)
            .context("translation request failed")?;
        parse_translation(&body)
    }
}

/// Joins the translated segments of a `[[["seg", "src", ...], ...], ...]` payload.
pub(crate) fn parse_translation(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body).context("translation payload is not JSON")?;
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .context("unexpected translation payload shape")?;
    let joined: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();
    let joined = joined.trim();
    if joined.is_empty() {
        anyhow::bail!("translation payload has no text");
    }
    Ok(joined.to_string())
}
