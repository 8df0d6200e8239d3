//! Fluent builder for [`GrabConfig`]
//!
//! The builder is the single place defaults are resolved: whatever it
//! emits is complete, and the pipeline never falls back to a default at a
//! use site.

use crate::utils::constants::{
    DEFAULT_BACKGROUND_IMAGE_FETCHES, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_ASSET_SIZE,
    DEFAULT_PAGE_LOAD_TIMEOUT_SECS, DEFAULT_SCREENSHOT_QUALITY, DEFAULT_STYLESHEET_FETCHES,
    USER_AGENT,
};

use super::types::{GrabConfig, ImageFormat};

pub struct GrabConfigBuilder {
    url: String,
    create_html: bool,
    create_snapshot: bool,
    create_zip: bool,
    image_format: ImageFormat,
    insert_watermark: bool,
    watermark_text: String,
    fetch_timeout_secs: u64,
    max_asset_size: usize,
    user_agent: String,
    headless: bool,
    screenshot_quality: u8,
    page_load_timeout_secs: u64,
    stylesheet_fetches: usize,
    background_image_fetches: usize,
}

impl GrabConfigBuilder {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            create_html: true,
            create_snapshot: true,
            create_zip: true,
            image_format: ImageFormat::Png,
            insert_watermark: false,
            watermark_text: String::new(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_asset_size: DEFAULT_MAX_ASSET_SIZE,
            user_agent: USER_AGENT.to_string(),
            headless: true,
            screenshot_quality: DEFAULT_SCREENSHOT_QUALITY,
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            stylesheet_fetches: DEFAULT_STYLESHEET_FETCHES,
            background_image_fetches: DEFAULT_BACKGROUND_IMAGE_FETCHES,
        }
    }

    pub fn create_html(mut self, value: bool) -> Self {
        self.create_html = value;
        self
    }

    pub fn create_snapshot(mut self, value: bool) -> Self {
        self.create_snapshot = value;
        self
    }

    pub fn create_zip(mut self, value: bool) -> Self {
        self.create_zip = value;
        self
    }

    pub fn image_format(mut self, value: ImageFormat) -> Self {
        self.image_format = value;
        self
    }

    pub fn insert_watermark(mut self, value: bool) -> Self {
        self.insert_watermark = value;
        self
    }

    pub fn watermark_text(mut self, value: impl Into<String>) -> Self {
        self.watermark_text = value.into();
        self
    }

    pub fn fetch_timeout_secs(mut self, value: u64) -> Self {
        self.fetch_timeout_secs = value;
        self
    }

    pub fn max_asset_size(mut self, value: usize) -> Self {
        self.max_asset_size = value;
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = value.into();
        self
    }

    pub fn headless(mut self, value: bool) -> Self {
        self.headless = value;
        self
    }

    pub fn screenshot_quality(mut self, value: u8) -> Self {
        self.screenshot_quality = value.min(100);
        self
    }

    pub fn page_load_timeout_secs(mut self, value: u64) -> Self {
        self.page_load_timeout_secs = value;
        self
    }

    pub fn stylesheet_fetches(mut self, value: usize) -> Self {
        self.stylesheet_fetches = value.max(1);
        self
    }

    pub fn background_image_fetches(mut self, value: usize) -> Self {
        self.background_image_fetches = value.max(1);
        self
    }

    pub fn build(self) -> GrabConfig {
        GrabConfig {
            url: self.url,
            create_html: self.create_html,
            create_snapshot: self.create_snapshot,
            create_zip: self.create_zip,
            image_format: self.image_format,
            insert_watermark: self.insert_watermark,
            watermark_text: self.watermark_text,
            fetch_timeout_secs: self.fetch_timeout_secs,
            max_asset_size: self.max_asset_size,
            user_agent: self.user_agent,
            headless: self.headless,
            screenshot_quality: self.screenshot_quality,
            page_load_timeout_secs: self.page_load_timeout_secs,
            stylesheet_fetches: self.stylesheet_fetches,
            background_image_fetches: self.background_image_fetches,
        }
    }
}
