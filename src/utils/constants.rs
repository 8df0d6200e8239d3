//! Shared configuration constants for pagegrab
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Chrome user agent string sent with every fetch and passed to the
/// headless browser.
///
/// Matches a current stable Chrome on Windows; some CDNs serve degraded or
/// blocked responses to unknown agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Default per-fetch timeout in seconds.
///
/// Applies to the page fetch and every asset fetch alike. There is no retry:
/// a fetch either completes within this window or the asset is skipped.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default maximum size for a single fetched asset: 10 MiB
///
/// Enforced while streaming the body, so an oversized response is abandoned
/// mid-download rather than buffered whole.
pub const DEFAULT_MAX_ASSET_SIZE: usize = 10 * 1024 * 1024;

/// Maximum number of stylesheets fetched concurrently: 2
///
/// Deliberately low: each stylesheet triggers its own nested fan-out of
/// background-image fetches, so this cap bounds the multiplied concurrency,
/// not just the stylesheet downloads themselves.
pub const DEFAULT_STYLESHEET_FETCHES: usize = 2;

/// Maximum number of background-image fetches per stylesheet: 5
///
/// Nested under the stylesheet cap, bounding worst-case outbound
/// connections from stylesheet processing to `2 x 5`.
pub const DEFAULT_BACKGROUND_IMAGE_FETCHES: usize = 5;

/// Screenshot quality for lossy formats (JPEG/WebP): 90% compression
///
/// PNG captures ignore this value.
pub const DEFAULT_SCREENSHOT_QUALITY: u8 = 90;

/// Default maximum wait for a page to finish loading before capture,
/// in seconds.
///
/// The snapshot branch polls `document.readyState` up to this long;
/// capture proceeds on timeout rather than failing.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 10;
