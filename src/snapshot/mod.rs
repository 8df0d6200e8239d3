//! Snapshot capture via headless Chrome
//!
//! Renders the page in a real browser and returns an encoded screenshot.
//! Browser discovery tries, in order: the `CHROMIUM_PATH` environment
//! variable, well-known install locations, a `which` lookup, and finally a
//! managed Chromium download into the user cache directory.
//!
//! Everything in this module fails with [`SnapshotError`], which is fatal
//! to the snapshot branch only; the embedding branch keeps running and
//! its results are returned regardless.

pub mod watermark;

use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::{self, JoinHandle};

use crate::config::{GrabConfig, ImageFormat};
use crate::error::SnapshotError;
use crate::utils::constants::USER_AGENT;

/// Render the configured page and return the encoded screenshot, with the
/// watermark composited when requested.
pub async fn capture(config: &GrabConfig) -> Result<Vec<u8>, SnapshotError> {
    let (mut browser, handler_task, user_data_dir) = launch_browser(config.headless()).await?;

    let captured = capture_page(&browser, config).await;

    if let Err(error) = browser.close().await {
        log::debug!("browser close failed: {error}");
    }
    handler_task.abort();
    let _ = std::fs::remove_dir_all(&user_data_dir);

    let bytes = captured?;

    if config.insert_watermark() && !config.watermark_text().is_empty() {
        watermark::apply(&bytes, config.image_format(), config.watermark_text())
    } else {
        Ok(bytes)
    }
}

async fn capture_page(browser: &Browser, config: &GrabConfig) -> Result<Vec<u8>, SnapshotError> {
    let page = browser
        .new_page(config.url())
        .await
        .map_err(|error| SnapshotError::Navigation {
            url: config.url().to_string(),
            message: error.to_string(),
        })?;

    // wait_for_navigation only covers the HTTP response; readiness of
    // scripts and images is polled separately below.
    let _ = page.wait_for_navigation().await;
    wait_for_page_load(&page, config.page_load_timeout()).await;

    let quality = match config.image_format() {
        // CDP rejects a quality value for PNG captures.
        ImageFormat::Png => None,
        ImageFormat::Jpeg | ImageFormat::Webp => Some(i64::from(config.screenshot_quality())),
    };
    let params = CaptureScreenshotParams {
        format: Some(cdp_format(config.image_format())),
        quality,
        capture_beyond_viewport: Some(true),
        ..Default::default()
    };

    page.screenshot(params)
        .await
        .map_err(|error| SnapshotError::Capture(error.to_string()))
}

/// Poll the page until `document.readyState` is `complete` and its images
/// have loaded, up to `max_wait`. Capture proceeds on timeout; a late page
/// yields a partial screenshot, not a failed branch.
async fn wait_for_page_load(page: &Page, max_wait: Duration) {
    const READY_SCRIPT: &str = r#"
        (function() {
            return {
                readyState: document.readyState,
                imagesLoaded: Array.from(document.images).every(img => img.complete)
            };
        })()
    "#;

    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    loop {
        if start.elapsed() >= max_wait {
            log::warn!("page load wait timed out after {max_wait:?}, capturing anyway");
            break;
        }

        match page.evaluate(READY_SCRIPT).await {
            Ok(result) => {
                if let Ok(value) = result.into_value::<serde_json::Value>() {
                    let ready =
                        value.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                    let images_loaded = value
                        .get("imagesLoaded")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                    if ready {
                        if !images_loaded {
                            // readyState can complete while images are
                            // still streaming in.
                            tokio::time::sleep(Duration::from_millis(500)).await;
                        }
                        break;
                    }
                }
            }
            Err(error) => log::debug!("readyState check failed: {error}, retrying"),
        }

        tokio::time::sleep(poll_interval).await;
    }

    // Settle buffer for CSS transitions and lazy-loaded content.
    tokio::time::sleep(Duration::from_millis(200)).await;
}

async fn launch_browser(
    headless: bool,
) -> Result<(Browser, JoinHandle<()>, PathBuf), SnapshotError> {
    let chrome_path = match find_browser_executable() {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let user_data_dir =
        std::env::temp_dir().join(format!("pagegrab_chrome_{}", std::process::id()));
    std::fs::create_dir_all(&user_data_dir)
        .map_err(|error| SnapshotError::Launch(error.to_string()))?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path)
        .arg(format!("--user-agent={USER_AGENT}"))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-notifications")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .arg("--ignore-certificate-errors");

    builder = if headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    let browser_config = builder.build().map_err(SnapshotError::Launch)?;

    log::debug!("launching browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|error| SnapshotError::Launch(error.to_string()))?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(error) = event {
                let message = error.to_string();
                // Chrome emits CDP events chromiumoxide cannot deserialize;
                // those are noise, not failures.
                let benign = message
                    .contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response");
                if !benign {
                    log::warn!("browser handler error: {message}");
                }
            }
        }
    });

    Ok((browser, handler_task, user_data_dir))
}

/// Find a Chrome/Chromium executable on this system.
fn find_browser_executable() -> Result<PathBuf, SnapshotError> {
    // Environment variable overrides all other methods.
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
        log::warn!(
            "CHROMIUM_PATH points to a non-existent file: {}",
            path.display()
        );
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            log::debug!("found browser at {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for name in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(name).output() {
                if output.status.success() {
                    let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !found.is_empty() {
                        return Ok(PathBuf::from(found));
                    }
                }
            }
        }
    }

    Err(SnapshotError::Browser(
        "no Chrome/Chromium executable found".into(),
    ))
}

/// Download a managed Chromium build into the user cache directory and
/// return its executable path.
async fn download_managed_browser() -> Result<PathBuf, SnapshotError> {
    log::info!("no local browser found, downloading managed Chromium");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pagegrab")
        .join("chromium");
    std::fs::create_dir_all(&cache_dir)
        .map_err(|error| SnapshotError::Browser(error.to_string()))?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .map_err(|error| SnapshotError::Browser(error.to_string()))?;
    let fetcher = BrowserFetcher::new(options);
    let revision = fetcher
        .fetch()
        .await
        .map_err(|error| SnapshotError::Browser(error.to_string()))?;

    log::debug!("downloaded Chromium to {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

fn cdp_format(format: ImageFormat) -> CaptureScreenshotFormat {
    match format {
        ImageFormat::Png => CaptureScreenshotFormat::Png,
        ImageFormat::Jpeg => CaptureScreenshotFormat::Jpeg,
        ImageFormat::Webp => CaptureScreenshotFormat::Webp,
    }
}
