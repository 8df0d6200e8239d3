//! Resource embedding
//!
//! Turns a fetched page into a self-contained document by inlining every
//! externally-referenced image, stylesheet, and script. The three embedders
//! share one phasing, taken from the resource-inlining pipeline this crate
//! grew out of:
//!
//! 1. parse the document once and collect each embedder's references
//!    synchronously (the DOM is Rc-based and never crosses an await),
//! 2. run the three fetch phases concurrently, each under its own
//!    concurrency policy,
//! 3. re-parse and apply every rewrite in a single parse/serialize cycle.
//!
//! The embedders own disjoint node partitions (`img`, `script[src]`,
//! `link[rel=stylesheet]`), so no rewrite ever touches another embedder's
//! nodes, and document order is preserved because rewriting mutates
//! existing nodes in place.
//!
//! A fetch failure for one asset is logged and that asset keeps its
//! original external reference; it never fails the embedding branch.

pub mod images;
mod rewrite;
pub mod scripts;
pub mod stylesheets;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kuchiki::traits::TendrilSink;
use url::Url;

use crate::error::EmbedError;
use crate::fetch::Fetcher;
use crate::utils::constants::{DEFAULT_BACKGROUND_IMAGE_FETCHES, DEFAULT_STYLESHEET_FETCHES};

/// Concurrency policy for one grab's embedding branch.
///
/// Images and scripts fan out unbounded (their count is bounded by page
/// size); stylesheets are capped because each one triggers a nested fan-out
/// of background-image fetches.
#[derive(Debug, Clone, Copy)]
pub struct EmbedLimits {
    /// Concurrent stylesheet fetches.
    pub stylesheet_fetches: usize,
    /// Concurrent background-image fetches per stylesheet.
    pub background_image_fetches: usize,
}

impl Default for EmbedLimits {
    fn default() -> Self {
        Self {
            stylesheet_fetches: DEFAULT_STYLESHEET_FETCHES,
            background_image_fetches: DEFAULT_BACKGROUND_IMAGE_FETCHES,
        }
    }
}

/// Encode fetched bytes into a data URL carrying the declared media type.
pub(crate) fn to_data_url(media_type: &str, bytes: &[u8]) -> String {
    let encoded_len = base64::encoded_len(bytes.len(), true).unwrap_or(0);
    let mut out = String::with_capacity(encoded_len + media_type.len() + 16);
    out.push_str("data:");
    out.push_str(media_type);
    out.push_str(";base64,");
    STANDARD.encode_string(bytes, &mut out);
    out
}

/// Embed every external image, stylesheet, and script of `html` and return
/// the rewritten document.
///
/// Errors only on structural failures (document query/serialization);
/// per-asset failures degrade to warnings.
pub async fn embed_page(
    fetcher: &Fetcher,
    page_url: &Url,
    html: &str,
    limits: EmbedLimits,
) -> Result<String, EmbedError> {
    let (image_refs, script_refs, stylesheet_refs) = {
        let document = kuchiki::parse_html().one(html);
        (
            images::collect(&document)?,
            scripts::collect(&document)?,
            stylesheets::collect(&document)?,
        )
        // document is dropped here, before the fetch phase starts
    };

    log::debug!(
        "embedding {} images, {} scripts, {} stylesheets for {page_url}",
        image_refs.len(),
        script_refs.len(),
        stylesheet_refs.len()
    );

    let (image_map, script_map, stylesheet_map) = tokio::join!(
        images::fetch_all(fetcher, page_url, image_refs),
        scripts::fetch_all(fetcher, page_url, script_refs),
        stylesheets::fetch_all(fetcher, page_url, stylesheet_refs, limits),
    );

    rewrite::apply(html, &image_map, &script_map, &stylesheet_map)
}
