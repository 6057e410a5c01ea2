//! JSON line printed on stdout for each request.

use crate::orchestrator::ResolutionResult;
use crate::package::{size_mb, PackageKind, PackageMetadata};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuccessReport<'a> {
    name: &'a str,
    version: &'a str,
    /// Human label, e.g. "10.00 MB" or "Unknown".
    size: &'a str,
    #[serde(rename = "sizeMB")]
    size_mb: f64,
    developer: &'a str,
    filename: &'a str,
    file_type: PackageKind,
    icon_url: Option<&'a str>,
    #[serde(rename = "hasOBB")]
    has_obb: bool,
}

impl<'a> From<&'a PackageMetadata> for SuccessReport<'a> {
    fn from(m: &'a PackageMetadata) -> Self {
        Self {
            name: &m.title,
            version: &m.version,
            size: &m.size_label,
            size_mb: size_mb(m.size_bytes),
            developer: &m.developer,
            filename: &m.file_name,
            file_type: m.file_kind,
            icon_url: m.icon_url.as_deref(),
            has_obb: m.has_expansion_data,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorReport<'a> {
    error: &'a str,
}

/// `{"error": "..."}` for any failure, including fatal ones raised outside the pipeline.
pub fn error_json(message: &str) -> serde_json::Result<String> {
    serde_json::to_string(&ErrorReport { error: message })
}

impl ResolutionResult {
    /// Single-line JSON for stdout.
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            ResolutionResult::Success(meta) => serde_json::to_string(&SuccessReport::from(meta)),
            ResolutionResult::Failure { message, .. } => error_json(message),
        }
    }
}
