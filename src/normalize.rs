//! Perspective rectification of the located card
//!
//! Warps the card quadrilateral onto an upright rectangle, keeps the canvas
//! landscape and optionally resizes it to a fixed size.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use tracing::{debug, instrument, warn};

use crate::config::NormalizerConfig;
use crate::debug::{labels, DebugSink};
use crate::geometry::{Geometry, Quadrilateral};

/// Rectifies located cards into a canonical orientation
#[derive(Debug, Clone)]
pub struct PerspectiveNormalizer {
    config: NormalizerConfig,
}

impl Default for PerspectiveNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PerspectiveNormalizer {
    pub fn new() -> Self {
        Self {
            config: NormalizerConfig::default(),
        }
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Warp `quad` out of `image`
    ///
    /// Returns `None` when the quadrilateral is degenerate, in which case the
    /// caller treats the page as a localization miss.
    #[instrument(skip_all)]
    pub fn rectify<G: Geometry + ?Sized>(
        &self,
        image: &RgbImage,
        quad: &Quadrilateral,
        geometry: &G,
        debug: &dyn DebugSink,
    ) -> Option<RgbImage> {
        let ordered = quad.canonical();
        let (width, height) = ordered.output_size();
        if width == 0 || height == 0 {
            warn!(width, height, "degenerate card outline");
            return None;
        }

        let warped = match geometry.warp_perspective(image, &ordered, width, height) {
            Some(w) => w,
            None => {
                warn!("perspective mapping could not be computed");
                return None;
            }
        };
        if debug.enabled() {
            debug.save(labels::WARPED, &DynamicImage::ImageRgb8(warped.clone()));
        }

        let upright = ensure_landscape(warped);
        debug!(width = upright.width(), height = upright.height(), "card rectified");
        Some(upright)
    }

    /// Optional fixed-canvas resize, identity when disabled
    pub fn fit_canvas(&self, image: RgbImage) -> RgbImage {
        if !self.config.use_fixed_canvas {
            return image;
        }
        let (w, h) = self.config.target_size;
        if image.dimensions() == (w, h) {
            return image;
        }
        imageops::resize(&image, w, h, FilterType::CatmullRom)
    }
}

/// Rotate portrait images 90° clockwise so width >= height
pub fn ensure_landscape(image: RgbImage) -> RgbImage {
    if image.height() > image.width() {
        imageops::rotate90(&image)
    } else {
        image
    }
}
