//! Package kind classification, file naming and size labels.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Label used when the package size is zero or unknown.
pub const UNKNOWN_SIZE: &str = "Unknown";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PackageKind {
    /// Plain single package.
    Apk,
    /// Bundle carrying expansion (OBB) data.
    Xapk,
    /// Split-package set.
    Apks,
}

impl PackageKind {
    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            PackageKind::Apk => ".apk",
            PackageKind::Xapk => ".xapk",
            PackageKind::Apks => ".apks",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PackageKind::Apk => "APK",
            PackageKind::Xapk => "XAPK",
            PackageKind::Apks => "APKS",
        }
    }

    /// Naming heuristic only: the archive itself is never inspected.
    pub fn has_expansion_data(self) -> bool {
        self == PackageKind::Xapk
    }

    /// Sniffs the kind from `Content-Disposition` and the address
    /// (case-insensitive substring match); anything else is a plain APK.
    pub fn classify(content_disposition: Option<&str>, url: &str) -> Self {
        let disposition = content_disposition.unwrap_or("").to_lowercase();
        let url = url.to_lowercase();
        let mentions = |ext: &str| disposition.contains(ext) || url.contains(ext);
        if mentions(".xapk") {
            PackageKind::Xapk
        } else if mentions(".apks") {
            PackageKind::Apks
        } else {
            PackageKind::Apk
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Local file name for a package: every character outside `[A-Za-z0-9_-]`
/// becomes `_`, followed by the kind's extension.
pub fn package_file_name(title: &str, kind: PackageKind) -> String {
    let mut out: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    out.push_str(kind.extension());
    out
}

/// Size in MB rounded to two decimals.
pub fn size_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

/// Human size label, e.g. `"10.00 MB"`, or `"Unknown"` for zero bytes.
pub fn size_label(bytes: u64) -> String {
    if bytes == 0 {
        return UNKNOWN_SIZE.to_string();
    }
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

/// Metadata of one successfully downloaded package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
    pub title: String,
    pub version: String,
    pub developer: String,
    pub icon_url: Option<String>,
    pub file_name: String,
    pub file_kind: PackageKind,
    pub has_expansion_data: bool,
    pub size_bytes: u64,
    pub size_label: String,
    /// Where the package was written.
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the written file.
    pub sha256: String,
}
