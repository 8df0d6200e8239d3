//! Pipeline orchestrator
//!
//! Drives one grab end to end: fetch the page, run the embedding and
//! snapshot branches concurrently, assemble the result. The page fetch is
//! the only fatal network step; each branch's failure is confined to its
//! own output field.

use url::Url;

use crate::archive;
use crate::config::GrabConfig;
use crate::embed;
use crate::error::GrabError;
use crate::fetch::Fetcher;
use crate::snapshot;

/// The outputs of one grab.
///
/// A field is present only when its `create_*` flag was set and that
/// branch succeeded; one branch failing never clears the others.
#[derive(Debug, Default)]
pub struct GrabResult {
    /// The page with external resources inlined.
    pub html: Option<String>,
    /// Encoded screenshot bytes.
    pub image: Option<Vec<u8>>,
    /// Zip archive of the other outputs.
    pub zip: Option<Vec<u8>>,
}

/// Grab a page per `config`.
///
/// Fatal errors are an unparsable URL, a failed page fetch, and archive
/// assembly; everything below that degrades to an absent result field with
/// a logged warning.
pub async fn grab(config: GrabConfig) -> Result<GrabResult, GrabError> {
    let page_url = Url::parse(config.url()).map_err(|source| GrabError::InvalidUrl {
        url: config.url().to_string(),
        source,
    })?;

    let fetcher = Fetcher::new(
        config.fetch_timeout(),
        config.max_asset_size(),
        config.user_agent(),
    )?;

    log::debug!("fetching page {page_url}");
    let page = fetcher
        .fetch(&page_url)
        .await
        .map_err(GrabError::PageFetch)?;
    let page_html = String::from_utf8_lossy(&page.bytes).into_owned();

    log::debug!("processing {page_url}: embedding and snapshot branches");
    let embed_branch = async {
        if !config.create_html() {
            return None;
        }
        Some(embed::embed_page(&fetcher, &page_url, &page_html, config.embed_limits()).await)
    };
    let snapshot_branch = async {
        if !config.create_snapshot() {
            return None;
        }
        Some(snapshot::capture(&config).await)
    };
    let (embedded, captured) = tokio::join!(embed_branch, snapshot_branch);

    let html = match embedded {
        None => None,
        Some(Ok(html)) => Some(html),
        Some(Err(error)) => {
            log::error!("embedding branch failed: {error}");
            None
        }
    };
    let image = match captured {
        None => None,
        Some(Ok(bytes)) => Some(bytes),
        Some(Err(error)) => {
            log::warn!("snapshot branch failed: {error}");
            None
        }
    };

    let zip = if config.create_zip() {
        log::debug!("assembling archive");
        Some(archive::package(
            html.as_deref(),
            image.as_deref(),
            config.image_format(),
        )?)
    } else {
        None
    };

    Ok(GrabResult { html, image, zip })
}
