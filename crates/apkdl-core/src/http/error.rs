//! Transport error type and its classification into fault kinds.

use std::fmt;

/// Error returned by any HTTP call (page fetch, translation, package stream).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The body consumer failed (e.g. disk full, permission denied).
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

/// Coarse classification used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Timeout,
    Connection,
    Http(u32),
    Storage,
    Other,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Timeout => write!(f, "timeout"),
            FaultKind::Connection => write!(f, "connection"),
            FaultKind::Http(code) => write!(f, "http {}", code),
            FaultKind::Storage => write!(f, "storage"),
            FaultKind::Other => write!(f, "other"),
        }
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> FaultKind {
    if e.is_operation_timedout() {
        return FaultKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FaultKind::Connection;
    }
    FaultKind::Other
}

impl TransportError {
    pub fn kind(&self) -> FaultKind {
        match self {
            TransportError::Curl(e) => classify_curl_error(e),
            TransportError::Http(code) => FaultKind::Http(*code),
            TransportError::Storage(_) => FaultKind::Storage,
        }
    }
}
