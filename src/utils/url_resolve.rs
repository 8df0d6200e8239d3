//! URL resolution for resource references
//!
//! Turns a possibly relative reference plus a base URL into an absolute,
//! fetchable URL. References found inside CSS `url(...)` tokens get their
//! own mode: quoting artifacts are stripped and the reference resolves
//! against the stylesheet's own URL, so relative paths land next to the
//! stylesheet rather than next to the page.

use url::Url;

/// Resolve `reference` against `base`.
///
/// * An absolute reference (scheme + host) is returned unchanged.
/// * A protocol-relative reference (`//host/path`) adopts the scheme of
///   `base`.
/// * Anything else is resolved with standard relative-URL semantics, which
///   covers `../`, root-relative `/path`, and plain relative paths.
///
/// With `from_css` set, stray quote characters that leak out of raw CSS
/// tokens are stripped before resolution.
///
/// Returns `None` for references that cannot be resolved to a fetchable
/// http(s) URL; an unparsable or non-http reference is a non-fatal miss,
/// and the caller skips the asset.
pub fn resolve(base: &Url, reference: &str, from_css: bool) -> Option<Url> {
    let reference = if from_css {
        reference.trim().trim_matches(|c| c == '\'' || c == '"').trim()
    } else {
        reference.trim()
    };

    if reference.is_empty() {
        return None;
    }

    let resolved = if let Some(rest) = reference.strip_prefix("//") {
        // Protocol-relative: adopt the base scheme.
        let scheme = match base.scheme() {
            "" => "http",
            s => s,
        };
        Url::parse(&format!("{scheme}://{rest}")).ok()?
    } else if let Ok(absolute) = Url::parse(reference) {
        if absolute.has_host() {
            absolute
        } else {
            base.join(reference).ok()?
        }
    } else {
        base.join(reference).ok()?
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}
