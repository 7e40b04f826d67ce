//! Error types shared across the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Reading a stylesheet's rules was refused by the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetAccessError {
    #[error("cross-origin stylesheet {href} is not readable from {document_origin}")]
    CrossOrigin {
        href: String,
        document_origin: String,
    },
    #[error("access to stylesheet rules denied: {0}")]
    Denied(String),
}

/// Fetching the text of a linked stylesheet failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("{0} is not a local file path")]
    BadFileUrl(String),
    #[error("unsupported URL scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("no stylesheet registered for {0}")]
    NotFound(String),
}

/// Writing to the clipboard was rejected.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard backend error: {0}")]
    Backend(#[from] arboard::Error),
    #[error("clipboard rejected the write: {0}")]
    Rejected(String),
}

/// Scheduling or completing a deferred clipboard write failed.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to schedule clipboard write: {0}")]
    Schedule(#[source] std::io::Error),
    #[error("clipboard write never completed")]
    Abandoned,
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}
