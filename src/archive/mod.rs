//! Zip packaging
//!
//! Assembles the grab outputs into a single in-memory zip archive:
//! `page.html` for the embedded document and `snap.<ext>` for the
//! screenshot. The image entry always uses the store method: deflate on
//! top of already-compressed image payloads has produced corrupted entries
//! in some container implementations, so store-only is a packaging rule
//! here, not an optimization.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ImageFormat;
use crate::error::ArchiveError;

/// Entry name for the embedded HTML document.
pub const HTML_ENTRY: &str = "page.html";

/// Build the archive from whichever outputs exist and return its bytes.
pub fn package(
    html: Option<&str>,
    snapshot: Option<&[u8]>,
    format: ImageFormat,
) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    if let Some(html) = html {
        writer.start_file(
            HTML_ENTRY,
            FileOptions::default().compression_method(CompressionMethod::Deflated),
        )?;
        writer.write_all(html.as_bytes())?;
    }

    if let Some(bytes) = snapshot {
        writer.start_file(
            snapshot_entry_name(format),
            FileOptions::default().compression_method(CompressionMethod::Stored),
        )?;
        writer.write_all(bytes)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Entry name for the screenshot in the configured format.
pub fn snapshot_entry_name(format: ImageFormat) -> String {
    format!("snap.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn html_and_snapshot_entries_round_trip() {
        let html = "<html><body>archived</body></html>";
        let image: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

        let bytes = package(Some(html), Some(&image), ImageFormat::Png).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut page = String::new();
        archive
            .by_name("page.html")
            .unwrap()
            .read_to_string(&mut page)
            .unwrap();
        assert_eq!(page, html);

        let mut snap = Vec::new();
        archive
            .by_name("snap.png")
            .unwrap()
            .read_to_end(&mut snap)
            .unwrap();
        assert_eq!(snap, image);
    }

    #[test]
    fn snapshot_entry_uses_store_method() {
        let image = vec![7u8; 2048];
        let bytes = package(None, Some(&image), ImageFormat::Jpeg).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entry = archive.by_name("snap.jpg").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn html_only_archive_has_single_entry() {
        let bytes = package(Some("<p>x</p>"), None, ImageFormat::Png).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn empty_archive_is_still_valid() {
        let bytes = package(None, None, ImageFormat::Png).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn entry_name_follows_format_extension() {
        assert_eq!(snapshot_entry_name(ImageFormat::Png), "snap.png");
        assert_eq!(snapshot_entry_name(ImageFormat::Jpeg), "snap.jpg");
        assert_eq!(snapshot_entry_name(ImageFormat::Webp), "snap.webp");
    }
}
