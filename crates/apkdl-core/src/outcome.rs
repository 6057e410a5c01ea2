//! Tagged result of one pipeline stage.
//!
//! A stage returns `anyhow::Result<Outcome<T>>`: `Err` is fatal and aborts the
//! whole request, `Outcome::Soft` abandons only the current candidate.

use crate::http::TransportError;
use std::fmt;

/// Why a stage gave up on the current candidate.
#[derive(Debug)]
pub enum SoftFailure {
    /// DNS/connect/timeout/non-2xx or a failed write of the body.
    Transport(TransportError),
    /// A selector chain was exhausted without a match.
    Miss(&'static str),
}

impl fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoftFailure::Transport(e) => write!(f, "transport fault ({}): {}", e.kind(), e),
            SoftFailure::Miss(what) => write!(f, "no {} found", what),
        }
    }
}

impl From<TransportError> for SoftFailure {
    fn from(e: TransportError) -> Self {
        SoftFailure::Transport(e)
    }
}

#[derive(Debug)]
pub enum Outcome<T> {
    Found(T),
    Soft(SoftFailure),
}

impl<T> Outcome<T> {
    pub fn miss(what: &'static str) -> Self {
        Outcome::Soft(SoftFailure::Miss(what))
    }

    pub fn from_option(value: Option<T>, what: &'static str) -> Self {
        match value {
            Some(v) => Outcome::Found(v),
            None => Outcome::miss(what),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }
}

impl<T> From<Result<T, TransportError>> for Outcome<T> {
    fn from(r: Result<T, TransportError>) -> Self {
        match r {
            Ok(v) => Outcome::Found(v),
            Err(e) => Outcome::Soft(SoftFailure::Transport(e)),
        }
    }
}

/// Unwraps a `Found` value or returns the soft failure from the enclosing stage.
macro_rules! found_or_return {
    ($outcome:expr) => {
        match $outcome {
            $crate::outcome::Outcome::Found(v) => v,
            $crate::outcome::Outcome::Soft(f) => {
                return Ok($crate::outcome::Outcome::Soft(f));
            }
        }
    };
}
pub(crate) use found_or_return;
