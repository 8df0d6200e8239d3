//! Error types for the grab pipeline
//!
//! Each concern owns its own error enum; the containment scope matters more
//! than the variants. `GrabError` is the only error a caller of [`grab`]
//! ever sees: everything below the page fetch is contained at the smallest
//! possible scope (single asset, single stylesheet, single branch) and
//! degrades to a logged warning instead of failing the grab.
//!
//! [`grab`]: crate::grab

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that fail an entire grab.
#[derive(Debug, Error)]
pub enum GrabError {
    /// The configured page URL could not be parsed.
    #[error("invalid page URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to initialize HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The initial page fetch failed or returned non-2xx. Fatal: no
    /// branches start after this.
    #[error("failed to fetch page: {0}")]
    PageFetch(#[source] FetchError),

    /// Archive assembly failed while `create_zip` was requested.
    #[error("failed to package archive: {0}")]
    Archive(#[from] ArchiveError),
}

/// A single asset retrieval failure.
///
/// Never fatal on its own: embedders log these and keep the original
/// external reference. Only the page fetch promotes one into a
/// [`GrabError::PageFetch`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("{url} exceeds the {limit}-byte asset size limit")]
    TooLarge { url: String, limit: usize },
}

/// Structural failure in the embedding branch.
///
/// Per-asset fetch failures are not represented here; an embedder only
/// errors when the document itself cannot be queried or serialized. An
/// `EmbedError` nulls the `html` result field and nothing else.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("document query failed for selector {0:?}")]
    Selector(&'static str),
}

/// A stylesheet body that could not be parsed into a rule tree.
///
/// Non-fatal: the stylesheet embedder falls back to inlining the raw
/// fetched text verbatim.
#[derive(Debug, Error)]
#[error("stylesheet is not structurally valid CSS")]
pub struct CssParseError;

/// Failures in the snapshot branch. Fatal to that branch only: the `image`
/// result field stays empty while the embedding branch's output is returned
/// intact.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no usable browser executable: {0}")]
    Browser(String),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("screenshot capture failed: {0}")]
    Capture(String),

    #[error("failed to composite watermark: {0}")]
    Watermark(#[from] image::ImageError),
}

/// Zip assembly failures.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip assembly failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("zip write failed: {0}")]
    Io(#[from] std::io::Error),
}
