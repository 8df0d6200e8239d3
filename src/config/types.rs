//! Core configuration types for page grabbing
//!
//! [`GrabConfig`] is the fully-resolved, immutable options record for one
//! grab. Every default is filled in by the builder before the pipeline
//! starts; nothing downstream resolves a default on its own.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::embed::EmbedLimits;

/// Raster formats the rendering capability can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Canonical lowercase file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    /// Case-insensitive, so `"PNG"` and `"png"` both work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "webp" => Ok(ImageFormat::Webp),
            other => Err(format!(
                "unsupported image format {other:?} (expected png, jpg, or webp)"
            )),
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Main configuration struct for one grab.
///
/// Construct via [`GrabConfig::builder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrabConfig {
    pub(crate) url: String,
    pub(crate) create_html: bool,
    pub(crate) create_snapshot: bool,
    pub(crate) create_zip: bool,
    pub(crate) image_format: ImageFormat,
    pub(crate) insert_watermark: bool,
    pub(crate) watermark_text: String,
    pub(crate) fetch_timeout_secs: u64,
    pub(crate) max_asset_size: usize,
    pub(crate) user_agent: String,
    pub(crate) headless: bool,
    pub(crate) screenshot_quality: u8,
    pub(crate) page_load_timeout_secs: u64,
    pub(crate) stylesheet_fetches: usize,
    pub(crate) background_image_fetches: usize,
}

impl GrabConfig {
    pub fn builder(url: impl Into<String>) -> super::builder::GrabConfigBuilder {
        super::builder::GrabConfigBuilder::new(url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn create_html(&self) -> bool {
        self.create_html
    }

    pub fn create_snapshot(&self) -> bool {
        self.create_snapshot
    }

    pub fn create_zip(&self) -> bool {
        self.create_zip
    }

    pub fn image_format(&self) -> ImageFormat {
        self.image_format
    }

    pub fn insert_watermark(&self) -> bool {
        self.insert_watermark
    }

    pub fn watermark_text(&self) -> &str {
        &self.watermark_text
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn max_asset_size(&self) -> usize {
        self.max_asset_size
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn headless(&self) -> bool {
        self.headless
    }

    pub fn screenshot_quality(&self) -> u8 {
        self.screenshot_quality
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    /// Concurrency policy handed to the embedding branch.
    pub fn embed_limits(&self) -> EmbedLimits {
        EmbedLimits {
            stylesheet_fetches: self.stylesheet_fetches,
            background_image_fetches: self.background_image_fetches,
        }
    }
}
