//! QR encoding adapter over the `qrcode` crate.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use log::warn;
use qrcode::{Color, QrCode};

use crate::config::QR_SIZE;
use crate::error::{PipelineError, Result};

/// Light border around the symbol, in modules. The QR standard asks for four.
pub const QUIET_ZONE: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// A rendered QR code: black modules on white, square, 8-bit greyscale.
#[derive(Clone, PartialEq, Eq)]
pub struct QrImage {
    text: String,
    raster: GrayImage,
}

impl QrImage {
    /// The text this image encodes.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Row-major luma bytes, one per pixel.
    pub fn pixels(&self) -> &[u8] {
        self.raster.as_raw()
    }

    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        self.raster
            .get_pixel_checked(x, y)
            .is_some_and(|pixel| pixel.0[0] < 128)
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.raster
    }

    /// Lossless PNG serialization.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.raster
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

impl std::fmt::Debug for QrImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrImage")
            .field("text_len", &self.text.len())
            .field("width", &self.raster.width())
            .field("height", &self.raster.height())
            .finish()
    }
}

/// Encodes `text` into a [`QR_SIZE`]×[`QR_SIZE`] image.
pub fn encode(text: &str) -> Result<QrImage> {
    encode_with_size(text, QR_SIZE)
}

/// Encodes `text` with default error correction into a `size`×`size` image.
///
/// Modules are scaled by the largest whole factor that fits the symbol and
/// its quiet zone, then centred. If `size` is smaller than the symbol the
/// image is cropped.
pub fn encode_with_size(text: &str, size: u32) -> Result<QrImage> {
    let code = QrCode::new(text.as_bytes()).map_err(|source| {
        warn!(
            target: "shareasqr::encoder",
            "QR encoding failed for {} bytes: {source}",
            text.len()
        );
        PipelineError::Encode {
            text: text.to_owned(),
            source,
        }
    })?;

    let modules = code.width() as u32;
    let symbol = modules + 2 * QUIET_ZONE;
    let scale = (size / symbol).max(1);
    let origin = size.saturating_sub(symbol * scale) / 2 + QUIET_ZONE * scale;

    let mut raster = GrayImage::from_pixel(size, size, LIGHT);
    for (index, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let index = index as u32;
        let left = origin + (index % modules) * scale;
        let top = origin + (index / modules) * scale;
        for y in top..(top + scale).min(size) {
            for x in left..(left + scale).min(size) {
                raster.put_pixel(x, y, DARK);
            }
        }
    }

    Ok(QrImage {
        text: text.to_owned(),
        raster,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_into_fixed_square() {
        let image = encode("https://example.com").expect("short URL fits");

        assert_eq!((image.width(), image.height()), (QR_SIZE, QR_SIZE));
        assert_eq!(image.text(), "https://example.com");
        assert_eq!(image.pixels().len(), (QR_SIZE * QR_SIZE) as usize);
    }

    #[test]
    fn quiet_zone_and_corners_are_light() {
        let image = encode("quiet").expect("fits");

        assert!(!image.is_dark(0, 0));
        assert!(!image.is_dark(QR_SIZE - 1, QR_SIZE - 1));
        assert!(!image.is_dark(QR_SIZE, 0), "out of bounds is never dark");
    }

    #[test]
    fn finder_pattern_is_dark() {
        let code = QrCode::new(b"finder").expect("fits");
        let symbol = code.width() as u32 + 2 * QUIET_ZONE;
        let scale = QR_SIZE / symbol;
        let origin = (QR_SIZE - symbol * scale) / 2 + QUIET_ZONE * scale;

        let image = encode("finder").expect("fits");
        // Top-left module of the top-left finder pattern.
        assert!(image.is_dark(origin, origin));
        assert!(image.is_dark(origin + scale - 1, origin + scale - 1));
        // Just outside it, inside the quiet zone.
        assert!(!image.is_dark(origin - 1, origin - 1));
    }

    #[test]
    fn same_text_gives_identical_pixels() {
        let first = encode("deterministic").expect("fits");
        let second = encode("deterministic").expect("fits");

        assert_eq!(first, second);
        assert_ne!(first.pixels(), encode("different").expect("fits").pixels());
    }

    #[test]
    fn oversized_text_is_an_encode_failure() {
        // The largest symbol holds 2331 bytes at the default error correction.
        let text = "x".repeat(3000);

        match encode(&text) {
            Err(PipelineError::Encode { text: failed, source }) => {
                assert_eq!(failed.len(), 3000);
                assert_eq!(source, qrcode::types::QrError::DataTooLong);
            }
            other => panic!("expected encode failure, got {other:?}"),
        }
    }

    #[test]
    fn png_is_lossless_and_stable() {
        let image = encode("png").expect("fits");
        let png = image.to_png().expect("encodes");

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(png, image.to_png().expect("encodes"));

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .expect("valid png")
            .to_luma8();
        assert_eq!(&decoded, image.as_gray());
    }
}
