//! Machine-readable code detection
//!
//! A detected code marks the back face of the card. Detection counts even when
//! the payload cannot be decoded.

use image::RgbImage;
use tracing::{debug, warn};

use crate::geometry::Point;

/// A localized code and whatever payload could be decoded
#[derive(Debug, Clone, PartialEq)]
pub struct CodeDetection {
    /// Decoded text, empty when decoding failed
    pub payload: String,
    /// Code outline in canvas coordinates
    pub corners: [Point; 4],
}

/// Detect-and-decode primitive
pub trait CodeScanner {
    fn detect_and_decode(&self, image: &RgbImage) -> Option<CodeDetection>;
}

impl<T: CodeScanner + ?Sized> CodeScanner for &T {
    fn detect_and_decode(&self, image: &RgbImage) -> Option<CodeDetection> {
        (**self).detect_and_decode(image)
    }
}

/// QR code scanner backed by `rqrr`
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeScanner;

impl CodeScanner for QrCodeScanner {
    fn detect_and_decode(&self, image: &RgbImage) -> Option<CodeDetection> {
        let gray = image::imageops::grayscale(image);
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            gray.width() as usize,
            gray.height() as usize,
            |x, y| gray.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        let first = grids.first()?;

        let corners = first.bounds.map(|p| Point::new(p.x as f32, p.y as f32));
        let payload = grids
            .iter()
            .find_map(|grid| match grid.decode() {
                Ok((_, text)) => Some(text),
                Err(e) => {
                    warn!(error = %e, "QR grid found but could not be decoded");
                    None
                }
            })
            .unwrap_or_default();

        debug!(grids = grids.len(), payload_len = payload.len(), "QR code detected");
        Some(CodeDetection { payload, corners })
    }
}
