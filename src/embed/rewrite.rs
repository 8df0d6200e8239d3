//! Single-pass rewrite application
//!
//! Applies every embedder's replacements to the document in one
//! parse/serialize cycle. Rewrites are keyed by the raw attribute value
//! each reference was collected with, so a node whose asset failed to
//! fetch has no map entry and keeps its original external reference.

use std::collections::HashMap;

use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;

use crate::embed::{images, scripts, stylesheets};
use crate::error::EmbedError;

pub(crate) fn apply(
    html: &str,
    image_map: &HashMap<String, String>,
    script_map: &HashMap<String, String>,
    stylesheet_map: &HashMap<String, String>,
) -> Result<String, EmbedError> {
    if image_map.is_empty() && script_map.is_empty() && stylesheet_map.is_empty() {
        return Ok(html.to_string());
    }

    let document = kuchiki::parse_html().one(html);

    if !image_map.is_empty() {
        // Attribute-only rewrite: direct iteration is safe, nothing detaches.
        let matches = document
            .select(images::SELECTOR)
            .map_err(|()| EmbedError::Selector(images::SELECTOR))?;
        for node in matches {
            let src = {
                let attributes = node.attributes.borrow();
                attributes.get("src").map(str::to_string)
            };
            if let Some(src) = src {
                if let Some(data_url) = image_map.get(&src) {
                    node.attributes.borrow_mut().insert("src", data_url.clone());
                }
            }
        }
    }

    if !stylesheet_map.is_empty() {
        // Nodes are collected first because detaching during iteration
        // invalidates the iterator.
        let matches: Vec<_> = document
            .select(stylesheets::SELECTOR)
            .map_err(|()| EmbedError::Selector(stylesheets::SELECTOR))?
            .collect();
        for node_ref in matches {
            let href = {
                let attributes = node_ref.attributes.borrow();
                attributes.get("href").map(str::to_string)
            };
            if let Some(href) = href {
                if let Some(stylesheet) = stylesheet_map.get(&href) {
                    let markup = format!("<style type=\"text/css\">\n{stylesheet}\n</style>");
                    if let Some(style_node) = fragment_element(&markup, "style") {
                        let node = node_ref.as_node();
                        node.insert_before(style_node);
                        node.detach();
                    }
                }
            }
        }
    }

    if !script_map.is_empty() {
        let matches: Vec<_> = document
            .select(scripts::SELECTOR)
            .map_err(|()| EmbedError::Selector(scripts::SELECTOR))?
            .collect();
        for node_ref in matches {
            let src = {
                let attributes = node_ref.attributes.borrow();
                attributes.get("src").map(str::to_string)
            };
            if let Some(src) = src {
                if let Some(text) = script_map.get(&src) {
                    let markup = format!("<script type=\"text/javascript\">{text}</script>");
                    if let Some(script_node) = fragment_element(&markup, "script") {
                        let node = node_ref.as_node();
                        node.insert_before(script_node);
                        node.detach();
                    }
                }
            }
        }
    }

    let mut out = Vec::new();
    document.serialize(&mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Parse a small markup fragment and pull out the first element matching
/// `selector`, detached and ready for insertion into another tree.
fn fragment_element(markup: &str, selector: &str) -> Option<NodeRef> {
    let fragment = kuchiki::parse_html().one(markup);
    let element = fragment.select_first(selector).ok()?;
    let node = element.as_node().clone();
    node.detach();
    Some(node)
}
