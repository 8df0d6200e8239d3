//! pagegrab: save a web page as one self-contained file
//!
//! Fetches a remote HTML page, inlines its externally-referenced images,
//! stylesheets (including CSS background images), and scripts as embedded
//! data, optionally captures a screenshot through headless Chrome, and
//! packages the outputs into a single zip archive.
//!
//! ```no_run
//! use pagegrab::{grab, GrabConfig};
//!
//! # async fn run() -> Result<(), pagegrab::GrabError> {
//! let config = GrabConfig::builder("https://example.com")
//!     .create_snapshot(false)
//!     .build();
//! let result = grab(config).await?;
//! assert!(result.html.is_some());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod css;
pub mod embed;
pub mod error;
pub mod fetch;
mod grabber;
pub mod snapshot;
pub mod utils;

pub use config::{GrabConfig, GrabConfigBuilder, ImageFormat};
pub use error::{ArchiveError, EmbedError, FetchError, GrabError, SnapshotError};
pub use fetch::{FetchedAsset, Fetcher};
pub use grabber::{grab, GrabResult};
