//! Script embedder
//!
//! Every external `script[src]` is replaced by an inline script node
//! holding the fetched text. Literal `</script>` sequences inside the
//! fetched source are escaped first; left alone they would terminate the
//! inline element early and dump the remainder of the script into the
//! document as markup.

use std::collections::{HashMap, HashSet};

use kuchiki::NodeRef;
use url::Url;

use crate::error::EmbedError;
use crate::fetch::limiter::run_limited;
use crate::fetch::Fetcher;
use crate::utils::resolve;

pub(crate) const SELECTOR: &str = "script[src]";

/// Collect the raw `src` of every external script, deduplicated, in
/// document order.
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

/// Fetch every collected script concurrently and map its raw reference to
/// inline-safe script text.
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
                Ok(asset) => {
                    let text = String::from_utf8_lossy(&asset.bytes)
                        .replace("</script>", "<\\/script>");
                    Some((raw, text))
                }
                Err(error) => {
                    log::warn!("cannot get script {url}: {error}");
                    None
                }
            }
        })
        .collect();

    run_limited(futures, None).await.into_iter().flatten().collect()
}
