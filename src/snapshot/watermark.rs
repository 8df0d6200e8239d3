//! Watermark compositing
//!
//! Draws the watermark text onto captured screenshot bytes: decoded,
//! stamped with filled-and-outlined text anchored near the bottom-left,
//! and re-encoded in the requested format. Style and position are fixed.
//!
//! Text is rendered from a built-in 5x7 pixel font scaled up; characters
//! outside its repertoire fall back to `?`.

use std::io::Cursor;

use image::{DynamicImage, Rgba, RgbaImage};

use crate::config::ImageFormat;
use crate::error::SnapshotError;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Pixel scale applied to the 5x7 glyphs.
const SCALE: u32 = 3;
/// Distance from the left and bottom edges.
const MARGIN: u32 = 16;
/// Stroke thickness in canvas pixels.
const STROKE_OFFSET: i64 = 2;

const FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const STROKE: Rgba<u8> = Rgba([20, 20, 20, 255]);

/// Composite `text` onto `bytes` and re-encode in `format`.
pub fn apply(bytes: &[u8], format: ImageFormat, text: &str) -> Result<Vec<u8>, SnapshotError> {
    let decoded = image::load_from_memory(bytes).map_err(SnapshotError::Watermark)?;
    let mut canvas = decoded.to_rgba8();

    let height = canvas.height();
    let origin_x = i64::from(MARGIN);
    let origin_y = i64::from(height.saturating_sub(MARGIN + GLYPH_HEIGHT * SCALE));

    // Outline pass in eight directions, then the fill on top.
    for (dx, dy) in [
        (-STROKE_OFFSET, 0),
        (STROKE_OFFSET, 0),
        (0, -STROKE_OFFSET),
        (0, STROKE_OFFSET),
        (-STROKE_OFFSET, -STROKE_OFFSET),
        (STROKE_OFFSET, -STROKE_OFFSET),
        (-STROKE_OFFSET, STROKE_OFFSET),
        (STROKE_OFFSET, STROKE_OFFSET),
    ] {
        draw_text(&mut canvas, origin_x + dx, origin_y + dy, text, STROKE);
    }
    draw_text(&mut canvas, origin_x, origin_y, text, FILL);

    encode(canvas, format).map_err(SnapshotError::Watermark)
}

fn encode(canvas: RgbaImage, format: ImageFormat) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Png => {
            DynamicImage::ImageRgba8(canvas).write_to(&mut out, image::ImageFormat::Png)?;
        }
        ImageFormat::Jpeg => {
            // JPEG carries no alpha channel.
            let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
            DynamicImage::ImageRgb8(rgb).write_to(&mut out, image::ImageFormat::Jpeg)?;
        }
        ImageFormat::Webp => {
            DynamicImage::ImageRgba8(canvas).write_to(&mut out, image::ImageFormat::WebP)?;
        }
    }
    Ok(out.into_inner())
}

fn draw_text(canvas: &mut RgbaImage, origin_x: i64, origin_y: i64, text: &str, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let mut pen_x = origin_x;

    for ch in text.chars() {
        let rows = glyph(ch);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for sy in 0..SCALE {
                    for sx in 0..SCALE {
                        let px = pen_x + i64::from(col * SCALE + sx);
                        let py = origin_y + i64::from(row as u32 * SCALE + sy);
                        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                            canvas.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
        // One blank column between glyphs.
        pen_x += i64::from((GLYPH_WIDTH + 1) * SCALE);
    }
}

/// 5x7 glyph rows, most significant of the low five bits leftmost.
/// Lowercase maps to uppercase; anything unknown renders as `?`.
fn glyph(ch: char) -> [u8; 7] {
    let ch = if ch.is_ascii() {
        ch.to_ascii_uppercase()
    } else {
        '?'
    };
    match ch {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '@' => [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let canvas = RgbaImage::from_pixel(width, height, Rgba([90, 90, 90, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn watermark_keeps_dimensions_and_changes_anchor_region() {
        let original = png_fixture(320, 200);
        let stamped = apply(&original, ImageFormat::Png, "Grabbed").unwrap();

        let decoded = image::load_from_memory(&stamped).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (320, 200));

        // Some pixel inside the bottom-left anchor box must differ from the
        // uniform background.
        let background = Rgba([90, 90, 90, 255]);
        let y0 = 200 - MARGIN - GLYPH_HEIGHT * SCALE;
        let mut changed = false;
        for y in y0..(200 - MARGIN) {
            for x in MARGIN..(MARGIN + 80) {
                if *decoded.get_pixel(x, y) != background {
                    changed = true;
                }
            }
        }
        assert!(changed, "watermark left the anchor region untouched");
    }

    #[test]
    fn watermark_reencodes_in_requested_format() {
        let original = png_fixture(64, 64);
        let stamped = apply(&original, ImageFormat::Jpeg, "x").unwrap();
        assert_eq!(
            image::guess_format(&stamped).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn unknown_characters_fall_back_to_question_mark() {
        assert_eq!(glyph('☃'), glyph('?'));
    }
}
