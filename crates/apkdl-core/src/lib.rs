pub mod config;
pub mod logging;

// Pipeline stages, in request order.
pub mod query;
pub mod search;
pub mod resolver;
pub mod fetcher;
pub mod orchestrator;

pub mod extract;
pub mod http;
pub mod outcome;
pub mod package;
pub mod progress;
pub mod report;
pub mod storage;

pub use orchestrator::{FailureKind, Locale, Orchestrator, ResolutionResult};
