//! Background-image inlining for stylesheet rule trees
//!
//! Walks a parsed rule tree for `background` / `background-image`
//! declarations, fetches every referenced image, and overwrites the matched
//! declaration values with inline data URLs before the stylesheet itself is
//! embedded. A failed fetch leaves the declaration untouched; nothing here
//! can fail the stylesheet.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::css::{for_each_declaration_mut, CssItem};
use crate::embed::to_data_url;
use crate::fetch::limiter::run_limited;
use crate::fetch::Fetcher;
use crate::utils::resolve;

/// `url(...)` with optional quoting; capture is the bare reference.
static URL_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#).expect("url() pattern compiles")
});

/// Fallback for values that reference a path without url() wrapping.
static BARE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]?([^\s'";,()]+\.[A-Za-z]{2,5})['"]?"#).expect("bare path pattern compiles")
});

fn is_background_property(name: &str) -> bool {
    name.eq_ignore_ascii_case("background") || name.eq_ignore_ascii_case("background-image")
}

/// Extract the first path-like token from a declaration value.
///
/// `url(...)` wrapping is stripped first; failing that, the first bare
/// path-looking token is taken. Values with no such token (colors,
/// gradients, `none`) and already-inlined `data:` references yield `None`.
pub(crate) fn extract_image_reference(value: &str) -> Option<String> {
    let reference = if let Some(captures) = URL_FUNCTION.captures(value) {
        captures.get(1)?.as_str()
    } else {
        BARE_PATH.captures(value)?.get(1)?.as_str()
    };

    if reference.starts_with("data:") {
        return None;
    }
    Some(reference.to_string())
}

/// Fetch and inline every background image referenced by the tree.
///
/// References resolve against the stylesheet's own URL, at most `limit`
/// fetches in flight. On success the whole declaration value becomes
/// `url("data:...")`; on any failure the original value stays.
pub async fn inline_background_images(
    items: &mut [CssItem],
    fetcher: &Fetcher,
    stylesheet_url: &Url,
    limit: usize,
) {
    // First traversal: note the ordinal of every qualifying declaration
    // together with its extracted reference. Ordinals are stable because
    // both traversals visit declarations in the same depth-first order.
    let mut targets: Vec<(usize, String)> = Vec::new();
    {
        let mut ordinal = 0usize;
        for_each_declaration_mut(items, &mut |declaration| {
            if is_background_property(&declaration.property) {
                if let Some(reference) = extract_image_reference(&declaration.value) {
                    targets.push((ordinal, reference));
                }
            }
            ordinal += 1;
        });
    }

    if targets.is_empty() {
        return;
    }

    let futures: Vec<_> = targets
        .into_iter()
        .map(|(ordinal, reference)| async move {
            let url = resolve(stylesheet_url, &reference, true)?;
            match fetcher.fetch(&url).await {
                Ok(asset) => Some((ordinal, to_data_url(&asset.media_type, &asset.bytes))),
                Err(error) => {
                    log::warn!("cannot get background image {url}: {error}");
                    None
                }
            }
        })
        .collect();

    let fetched: HashMap<usize, String> = run_limited(futures, Some(limit))
        .await
        .into_iter()
        .flatten()
        .collect();

    if fetched.is_empty() {
        return;
    }

    // Second traversal: overwrite the matched declarations.
    let mut ordinal = 0usize;
    for_each_declaration_mut(items, &mut |declaration| {
        if let Some(data_url) = fetched.get(&ordinal) {
            declaration.value = format!("url(\"{data_url}\")");
        }
        ordinal += 1;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_quoted_and_unquoted_url_references() {
        assert_eq!(
            extract_image_reference("url(/img/bg.png)").as_deref(),
            Some("/img/bg.png")
        );
        assert_eq!(
            extract_image_reference("url('bg.png') no-repeat").as_deref(),
            Some("bg.png")
        );
        assert_eq!(
            extract_image_reference("#fff url(\"../dots.gif\") repeat-x").as_deref(),
            Some("../dots.gif")
        );
    }

    #[test]
    fn extracts_bare_path_without_wrapper() {
        assert_eq!(
            extract_image_reference("'/textures/paper.jpg'").as_deref(),
            Some("/textures/paper.jpg")
        );
    }

    #[test]
    fn skips_values_with_no_path() {
        assert_eq!(extract_image_reference("#ff00aa"), None);
        assert_eq!(extract_image_reference("none"), None);
        assert_eq!(
            extract_image_reference("linear-gradient(to right, rgba(0,0,0,0.5), #fff)"),
            None
        );
    }

    #[test]
    fn skips_already_inlined_data_urls() {
        assert_eq!(
            extract_image_reference("url(data:image/png;base64,AAAA)"),
            None
        );
    }

    #[test]
    fn background_property_match_is_case_insensitive() {
        assert!(is_background_property("Background-Image"));
        assert!(is_background_property("BACKGROUND"));
        assert!(!is_background_property("background-color"));
    }
}
