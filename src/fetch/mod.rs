//! Binary-safe HTTP retrieval
//!
//! One [`Fetcher`] serves the whole pipeline: the page fetch and every
//! asset fetch go through the same path. Bodies are streamed with a size
//! cap enforced mid-download, and bytes are never transcoded: an image
//! fetched through here is byte-for-byte what the server sent.
//!
//! There is no retry policy: a fetch either succeeds within its timeout or
//! the caller skips the asset and moves on.

pub mod limiter;

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::error::FetchError;

/// A retrieved resource: payload, declared media type, originating URL.
///
/// Created by the fetcher and consumed immediately by whichever embedder
/// requested it; never retained after encoding into the document.
#[derive(Debug)]
pub struct FetchedAsset {
    pub url: Url,
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// HTTP retrieval with a shared client, per-request timeout, and an asset
/// size cap.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_asset_size: usize,
}

impl Fetcher {
    pub fn new(
        timeout: Duration,
        max_asset_size: usize,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            max_asset_size,
        })
    }

    /// Perform a single GET for `url`.
    ///
    /// Any non-2xx status or transport failure is a [`FetchError`]; the
    /// media type comes from the Content-Type header, falling back to a
    /// guess from the URL's file extension.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedAsset, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| media_type_for_path(url.path()).to_string());

        // Reject oversized responses up front when the server declares a
        // length, then again while streaming in case it lied or omitted it.
        let expected = response.content_length().unwrap_or(0);
        if expected > self.max_asset_size as u64 {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_asset_size,
            });
        }

        let mut buffer = if expected > 0 {
            Vec::with_capacity(expected as usize)
        } else {
            Vec::new()
        };

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;
            if buffer.len() + chunk.len() > self.max_asset_size {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit: self.max_asset_size,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(FetchedAsset {
            url: url.clone(),
            bytes: buffer,
            media_type,
        })
    }
}

/// Guess a media type from a path's file extension.
///
/// Used only when the server sends no Content-Type; covers the asset kinds
/// this pipeline actually embeds.
fn media_type_for_path(path: &str) -> &'static str {
    let lowercased = path.to_lowercase();

    if lowercased.ends_with(".css") {
        "text/css"
    } else if lowercased.ends_with(".js") || lowercased.ends_with(".mjs") {
        "application/javascript"
    } else if lowercased.ends_with(".svg") {
        "image/svg+xml"
    } else if lowercased.ends_with(".png") {
        "image/png"
    } else if lowercased.ends_with(".jpg") || lowercased.ends_with(".jpeg") {
        "image/jpeg"
    } else if lowercased.ends_with(".gif") {
        "image/gif"
    } else if lowercased.ends_with(".webp") {
        "image/webp"
    } else if lowercased.ends_with(".ico") {
        "image/x-icon"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_guess_covers_embedded_kinds() {
        assert_eq!(media_type_for_path("/a/style.css"), "text/css");
        assert_eq!(media_type_for_path("/app.js"), "application/javascript");
        assert_eq!(media_type_for_path("/IMG/PHOTO.JPG"), "image/jpeg");
        assert_eq!(media_type_for_path("/favicon.ico"), "image/x-icon");
        assert_eq!(media_type_for_path("/data.bin"), "application/octet-stream");
    }
}
