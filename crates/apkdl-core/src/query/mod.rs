//! Query normalization: Arabic-script queries are translated before searching.
//!
//! Translation is best effort. Any failure of the service leaves the query
//! untouched.

mod google;

pub use google::GoogleTranslator;

use crate::config::TranslationConfig;

/// Text-to-text translation service.
pub trait Translator {
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> anyhow::Result<String>;
}

/// True if `text` has any character in the Arabic block (U+0600..=U+06FF).
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

pub struct QueryNormalizer<'a> {
    /// None disables translation entirely.
    translator: Option<&'a dyn Translator>,
    source_lang: String,
    target_lang: String,
}

impl<'a> QueryNormalizer<'a> {
    pub fn new(translator: &'a dyn Translator, cfg: &TranslationConfig) -> Self {
        Self {
            translator: cfg.enabled.then_some(translator),
            source_lang: cfg.source_lang.clone(),
            target_lang: cfg.target_lang.clone(),
        }
    }

    /// Returns the query to search for. Never fails and never returns an empty
    /// string for a non-empty input.
    pub fn normalize(&self, raw: &str) -> String {
        let Some(translator) = self.translator else {
            return raw.to_string();
        };
        if !contains_arabic(raw) {
            return raw.to_string();
        }
        match translator.translate(raw, &self.source_lang, &self.target_lang) {
            Ok(translated) if !translated.trim().is_empty() => {
                tracing::info!("translated '{}' to '{}'", raw, translated);
                translated
            }
            Ok(_) => {
                tracing::warn!("translation of '{}' was empty, using original text", raw);
                raw.to_string()
            }
            Err(e) => {
                tracing::warn!("translation failed: {:#}, using original text", e);
                raw.to_string()
            }
        }
    }
}
