//! Image embedder
//!
//! Every `img[src]` pointing at an external resource gets its `src`
//! rewritten to a `data:` URL. Fan-out is unbounded: image count per page
//! is bounded by page size.

use std::collections::{HashMap, HashSet};

use kuchiki::NodeRef;
use url::Url;

use crate::embed::to_data_url;
use crate::error::EmbedError;
use crate::fetch::limiter::run_limited;
use crate::fetch::Fetcher;
use crate::utils::resolve;

pub(crate) const SELECTOR: &str = "img[src]";

/// Collect the raw `src` of every embeddable image, deduplicated, in
/// document order. Sources that are empty or already inline are skipped;
/// a document with only `data:` images yields no work at all.
pub(crate) fn collect(document: &NodeRef) -> Result<Vec<String>, EmbedError> {
    let matches = document
        .select(SELECTOR)
        .map_err(|()| EmbedError::Selector(SELECTOR))?;

    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    for node in matches {
        let attributes = node.attributes.borrow();
        if let Some(src) = attributes.get("src") {
            if src.is_empty() || src.starts_with("data:") {
                continue;
            }
            if seen.insert(src.to_string()) {
                refs.push(src.to_string());
            }
        }
    }
    Ok(refs)
}

/// Fetch every collected image concurrently and map its raw reference to a
/// data URL. Failed fetches are logged and simply absent from the map.
pub(crate) async fn fetch_all(
    fetcher: &Fetcher,
    page_url: &Url,
    refs: Vec<String>,
) -> HashMap<String, String> {
    let futures: Vec<_> = refs
        .into_iter()
        .map(|raw| async move {
            let url = resolve(page_url, &raw, false)?;
            match fetcher.fetch(&url).await {
                Ok(asset) => Some((raw, to_data_url(&asset.media_type, &asset.bytes))),
                Err(error) => {
                    log::warn!("cannot get image {url}: {error}");
                    None
                }
            }
        })
        .collect();

    run_limited(futures, None).await.into_iter().flatten().collect()
}
