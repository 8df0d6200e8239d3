//! Stylesheet embedder
//!
//! Every external `link[rel=stylesheet]` is replaced by an inline `<style>`
//! holding the stylesheet text. A fetched stylesheet is parsed into a rule
//! tree so its background images can be inlined first; a stylesheet that
//! does not parse is inlined verbatim instead of being dropped.
//!
//! The fetch fan-out is bounded: stylesheet processing triggers a nested
//! fan-out of background-image fetches, and unbounded-times-bounded is
//! still unbounded.

use std::collections::{HashMap, HashSet};

use kuchiki::NodeRef;
use url::Url;

use crate::css;
use crate::embed::EmbedLimits;
use crate::error::EmbedError;
use crate::fetch::limiter::run_limited;
use crate::fetch::Fetcher;
use crate::utils::resolve;

pub(crate) const SELECTOR: &str = "link[rel=\"stylesheet\"]";

/// Collect the raw `href` of every external stylesheet, deduplicated, in
/// document order.
pub(crate) fn collect(document: &NodeRef) -> Result<Vec<String>, EmbedError> {
    let matches = document
        .select(SELECTOR)
        .map_err(|()| EmbedError::Selector(SELECTOR))?;

    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    for node in matches {
        let attributes = node.attributes.borrow();
        if let Some(href) = attributes.get("href") {
            if href.is_empty() || href.starts_with("data:") {
                continue;
            }
            if seen.insert(href.to_string()) {
                refs.push(href.to_string());
            }
        }
    }
    Ok(refs)
}

/// Fetch every collected stylesheet, at most `limits.stylesheet_fetches`
/// concurrently, run the background-image pipeline on each, and map its
/// raw reference to the final stylesheet text.
pub(crate) async fn fetch_all(
    fetcher: &Fetcher,
    page_url: &Url,
    refs: Vec<String>,
    limits: EmbedLimits,
) -> HashMap<String, String> {
    let futures: Vec<_> = refs
        .into_iter()
        .map(|raw| async move {
            let url = resolve(page_url, &raw, false)?;
            let asset = match fetcher.fetch(&url).await {
                Ok(asset) => asset,
                Err(error) => {
                    log::warn!("cannot get stylesheet {url}: {error}");
                    return None;
                }
            };

            let text = String::from_utf8_lossy(&asset.bytes).into_owned();
            let stylesheet = match css::parse_stylesheet(&text) {
                Ok(mut tree) => {
                    css::background::inline_background_images(
                        &mut tree,
                        fetcher,
                        &asset.url,
                        limits.background_image_fetches,
                    )
                    .await;
                    css::serialize(&tree)
                }
                Err(error) => {
                    log::warn!("{url}: {error}; inlining raw text");
                    text
                }
            };

            Some((raw, stylesheet))
        })
        .collect();

    run_limited(futures, Some(limits.stylesheet_fetches))
        .await
        .into_iter()
        .flatten()
        .collect()
}
