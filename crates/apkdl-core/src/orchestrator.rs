//! Resolution orchestrator: normalize → search → try candidates in rank order.
//!
//! The first candidate that makes it through link resolution and download
//! ends the request; a soft failure moves on to the next one and no candidate
//! is tried twice.

use crate::config::ApkdlConfig;
use crate::fetcher::PackageFetcher;
use crate::http::Transport;
use crate::outcome::Outcome;
use crate::package::PackageMetadata;
use crate::progress::Progress;
use crate::query::{contains_arabic, QueryNormalizer, Translator};
use crate::resolver::LinkResolver;
use crate::search::{SearchCandidate, SearchResolver};
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// Language used for user-visible failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Arabic,
    English,
}

impl Locale {
    /// Arabic when the query itself is written in Arabic script.
    pub fn detect(query: &str) -> Self {
        if contains_arabic(query) {
            Locale::Arabic
        } else {
            Locale::English
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No application name was given.
    NoQuery,
    /// The search produced zero candidates.
    NotFound,
    /// Candidates existed but every one failed at a later stage.
    AllAttemptsFailed,
}

impl FailureKind {
    pub fn message(self, locale: Locale, query: &str) -> String {
        match (self, locale) {
            (FailureKind::NoQuery, _) => "No app name provided".to_string(),
            (FailureKind::NotFound, Locale::Arabic) => format!(
                "لم يتم العثور على '{}' في APKPure.\n\nجرب:\n• استخدام الاسم الكامل للتطبيق\n• التحقق من الإملاء\n• كن أكثر تحديداً",
                query
            ),
            (FailureKind::NotFound, Locale::English) => format!(
                "'{}' was not found on APKPure.\n\nTry:\n• Using the app's full name\n• Checking the spelling\n• Being more specific",
                query
            ),
            (FailureKind::AllAttemptsFailed, Locale::Arabic) => format!(
                "تم العثور على تطبيقات تطابق '{}' لكن فشل تحميلها.\n\nالتطبيقات قد لا تكون متاحة أو حدث خطأ في التحميل.",
                query
            ),
            (FailureKind::AllAttemptsFailed, Locale::English) => format!(
                "Apps matching '{}' were found but could not be downloaded.\n\nThey may be unavailable, or the download failed.",
                query
            ),
        }
    }
}

/// The single externally observable output of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    Success(PackageMetadata),
    Failure { kind: FailureKind, message: String },
}

impl ResolutionResult {
    pub fn failure(kind: FailureKind, raw_query: &str) -> Self {
        ResolutionResult::Failure {
            kind,
            message: kind.message(Locale::detect(raw_query), raw_query),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionResult::Success(_))
    }
}

/// Per-request pipeline state, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normalizing,
    Searching,
    TryingCandidate(usize),
    Succeeded,
    FailedNotFound,
    FailedAllAttempts,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Normalizing => write!(f, "NORMALIZING"),
            State::Searching => write!(f, "SEARCHING"),
            State::TryingCandidate(i) => write!(f, "TRYING_CANDIDATE[{}]", i),
            State::Succeeded => write!(f, "SUCCEEDED"),
            State::FailedNotFound => write!(f, "FAILED_NOT_FOUND"),
            State::FailedAllAttempts => write!(f, "FAILED_ALL_ATTEMPTS"),
        }
    }
}

fn enter(state: State) {
    tracing::debug!("state: {}", state);
}

pub struct Orchestrator<'a> {
    normalizer: QueryNormalizer<'a>,
    search: SearchResolver<'a>,
    links: LinkResolver<'a>,
    fetcher: PackageFetcher<'a>,
    downloads_dir: PathBuf,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        cfg: &'a ApkdlConfig,
        transport: &'a dyn Transport,
        translator: &'a dyn Translator,
        downloads_dir: PathBuf,
    ) -> Self {
        Self {
            normalizer: QueryNormalizer::new(translator, &cfg.translation),
            search: SearchResolver::new(cfg, transport),
            links: LinkResolver::new(cfg, transport),
            fetcher: PackageFetcher::new(cfg, transport),
            downloads_dir,
        }
    }

    /// Resolves `raw_query` to at most one downloaded package. Anticipated
    /// failures come back as `ResolutionResult::Failure`; `Err` is fatal.
    pub fn resolve(
        &self,
        raw_query: &str,
        on_progress: &mut dyn FnMut(&Progress),
    ) -> Result<ResolutionResult> {
        let raw_query = raw_query.trim();
        if raw_query.is_empty() {
            return Ok(ResolutionResult::failure(FailureKind::NoQuery, raw_query));
        }
        tracing::info!("starting search for: {}", raw_query);

        enter(State::Normalizing);
        let query = self.normalizer.normalize(raw_query);

        enter(State::Searching);
        let candidates = self.search.search(&query)?;
        if candidates.is_empty() {
            enter(State::FailedNotFound);
            return Ok(ResolutionResult::failure(FailureKind::NotFound, raw_query));
        }

        for (i, candidate) in candidates.iter().enumerate() {
            enter(State::TryingCandidate(i));
            tracing::info!("trying candidate {}/{}: {}", i + 1, candidates.len(), candidate.title);
            match self.try_candidate(candidate, on_progress)? {
                Outcome::Found(meta) => {
                    enter(State::Succeeded);
                    return Ok(ResolutionResult::Success(meta));
                }
                Outcome::Soft(failure) => {
                    tracing::warn!("failed to download {}: {}, trying next", candidate.title, failure);
                }
            }
        }

        enter(State::FailedAllAttempts);
        Ok(ResolutionResult::failure(FailureKind::AllAttemptsFailed, raw_query))
    }

    fn try_candidate(
        &self,
        candidate: &SearchCandidate,
        on_progress: &mut dyn FnMut(&Progress),
    ) -> Result<Outcome<PackageMetadata>> {
        let resolved = match self.links.resolve(candidate)? {
            Outcome::Found(r) => r,
            Outcome::Soft(f) => return Ok(Outcome::Soft(f)),
        };
        self.fetcher.fetch(&resolved, &self.downloads_dir, on_progress)
    }
}
