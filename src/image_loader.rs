//! Unified image loading for card photographs and scans
//!
//! This module provides a single entry point for decoding uploads into the
//! RGB buffers the pipeline works on.
//!
//! ## Supported Formats
//!
//! Via the `image` crate: JPEG, PNG, BMP, TIFF, WebP and GIF (first frame).
//!
//! ## Design
//!
//! Decoding is the only stage that can fail hard. Everything downstream
//! degrades to empty or false values instead of returning errors.

use crate::error::{Result, ScanError};
use image::{ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Load an image from disk as an RGB buffer
///
/// # Errors
///
/// Returns `ScanError::ImageDecode` if:
/// - File cannot be opened
/// - Decoding fails
///
/// The format is sniffed from the file content, so uploads with a missing
/// or unusual extension still decode.
///
/// # Example
///
/// ```rust,no_run
/// use scan_idcard::image_loader::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("front.jpg"))?;
/// println!("Loaded image: {}x{}", image.width(), image.height());
/// # Ok::<(), scan_idcard::ScanError>(())
/// ```
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let reader = ImageReader::open(path).map_err(|e| {
        ScanError::image_decode(format!("Failed to open image file: {}", path.display()), e)
    })?;

    let reader = reader.with_guessed_format().map_err(|e| {
        ScanError::image_decode(format!("Failed to read image header: {}", path.display()), e)
    })?;

    let image = reader.decode().map_err(|e| {
        ScanError::image_decode(format!("Failed to decode image: {}", path.display()), e)
    })?;

    Ok(image.to_rgb8())
}

/// Decode an in-memory encoded image as an RGB buffer
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<RgbImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ScanError::image_decode("Failed to read image header", e))?;

    let image = reader
        .decode()
        .map_err(|e| ScanError::image_decode("Unsupported or corrupted image", e))?;

    Ok(image.to_rgb8())
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "gif"]
}

/// Check if a file extension is one of the usual upload types
///
/// Advisory only; [`load_image`] decodes by content regardless.
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("jpg"));
        assert!(is_supported_extension("PNG"));
        assert!(!is_supported_extension("pdf"));
        assert!(!is_supported_extension("heic"));
    }

    #[test]
    fn test_png_bytes_round_trip() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([10, 20, 30]));
        let mut encoded = Vec::new();
        img.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
            .unwrap();

        let decoded = load_image_from_bytes(&encoded).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let err = load_image_from_bytes(&[0u8, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, ScanError::ImageDecode { .. }));
    }

    #[test]
    fn test_missing_file_fails() {
        let err = load_image(Path::new("nonexistent_file.jpg")).unwrap_err();
        assert!(matches!(err, ScanError::ImageDecode { .. }));
    }

    #[test]
    fn test_content_decides_format_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::from_pixel(6, 4, Rgb([200, 10, 10]));

        let bare = dir.path().join("upload");
        img.save_with_format(&bare, image::ImageFormat::Png).unwrap();
        assert_eq!(load_image(&bare).unwrap(), img);

        let odd = dir.path().join("card.jfif");
        img.save_with_format(&odd, image::ImageFormat::Jpeg).unwrap();
        assert_eq!(load_image(&odd).unwrap().dimensions(), (6, 4));
    }

    #[test]
    fn test_non_image_content_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        std::fs::write(&path, b"%PDF-1.7 not an image").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, ScanError::ImageDecode { .. }));
    }
}
