//! Card outline localization
//!
//! Finds the ID card as the largest 4-corner polygon traced from the edge map:
//! - Blurs the grayscale image and extracts Canny edges
//! - Traces external contours and ranks them by enclosed area
//! - Approximates the largest candidates and accepts the first quadrilateral
//!
//! Selection is greedy: the first 4-vertex approximation in descending area
//! order wins, even if a smaller candidate is more rectangular.

use std::fmt;

use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use tracing::{debug, instrument};

use crate::config::LocalizerConfig;
use crate::constants::{gaussian_sigma_for_kernel, reasons};
use crate::debug::{contour_overlay, labels, DebugSink};
use crate::geometry::{polygon_area, polygon_perimeter, Contour, Geometry, Point, Quadrilateral};

/// Why no card outline was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizationMiss {
    /// The edge map produced no contours at all
    NoContours,
    /// No examined contour was both large enough and 4-cornered
    NoQuadrilateral,
}

impl LocalizationMiss {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalizationMiss::NoContours => reasons::NO_CONTOURS,
            LocalizationMiss::NoQuadrilateral => reasons::NO_QUADRILATERAL,
        }
    }
}

impl fmt::Display for LocalizationMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted card outline
#[derive(Debug, Clone, PartialEq)]
pub struct CardCandidate {
    /// Corners as produced by polygon approximation (not yet canonical)
    pub quadrilateral: Quadrilateral,
    /// Area of the traced contour in pixels
    pub contour_area: f64,
    /// Contour area as fraction of the image
    pub area_ratio: f64,
}

/// Card localizer implementing greedy quadrilateral selection
#[derive(Debug, Clone)]
pub struct CardLocalizer {
    config: LocalizerConfig,
}

impl Default for CardLocalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CardLocalizer {
    /// Create a localizer with default parameters
    pub fn new() -> Self {
        Self {
            config: LocalizerConfig::default(),
        }
    }

    /// Create a localizer with custom parameters
    pub fn with_config(config: LocalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocalizerConfig {
        &self.config
    }

    /// Locate the card outline in `image`
    ///
    /// Edge and contour overlays go to `debug`; nothing written there affects
    /// the outcome.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn locate<G: Geometry + ?Sized>(
        &self,
        image: &RgbImage,
        geometry: &G,
        debug: &dyn DebugSink,
    ) -> std::result::Result<CardCandidate, LocalizationMiss> {
        let edges = self.edge_map(image, geometry);
        if debug.enabled() {
            debug.save(labels::EDGES, &DynamicImage::ImageLuma8(edges.clone()));
        }

        let contours = geometry.external_contours(&edges);
        if contours.is_empty() {
            debug!("no contours in edge map");
            return Err(LocalizationMiss::NoContours);
        }

        let ranked = self.rank_candidates(contours);
        let image_area = image.width() as f64 * image.height() as f64;
        let min_area = self.config.min_area_ratio * image_area;

        let mut examined: Vec<Contour> = Vec::new();
        let mut accepted: Option<(usize, CardCandidate)> = None;

        for (contour, area) in &ranked {
            if *area < min_area {
                continue;
            }
            let approx = self.approximate(contour, geometry);
            debug!(area, vertices = approx.len(), "examined candidate");

            if approx.len() == 4 {
                let corners = [approx[0], approx[1], approx[2], approx[3]].map(Point::from);
                accepted = Some((
                    examined.len(),
                    CardCandidate {
                        quadrilateral: Quadrilateral::new(corners),
                        contour_area: *area,
                        area_ratio: if image_area > 0.0 { area / image_area } else { 0.0 },
                    },
                ));
                examined.push(approx);
                break;
            }
            examined.push(approx);
        }

        if debug.enabled() {
            let overlay = contour_overlay(image, &examined, accepted.as_ref().map(|(i, _)| *i));
            debug.save(labels::CONTOURS, &DynamicImage::ImageRgb8(overlay));
        }

        match accepted {
            Some((_, candidate)) => {
                debug!(area_ratio = candidate.area_ratio, "card outline accepted");
                Ok(candidate)
            }
            None => Err(LocalizationMiss::NoQuadrilateral),
        }
    }

    /// Blurred grayscale edge map
    fn edge_map<G: Geometry + ?Sized>(&self, image: &RgbImage, geometry: &G) -> GrayImage {
        let gray = image::imageops::grayscale(image);
        let sigma = gaussian_sigma_for_kernel(self.config.blur_kernel_size);
        let blurred = gaussian_blur_f32(&gray, sigma);
        geometry.edge_map(
            &blurred,
            self.config.canny_low_threshold,
            self.config.canny_high_threshold,
        )
    }

    /// Largest contours first, capped at `max_candidates`
    ///
    /// The sort is stable so equal areas keep tracing order.
    fn rank_candidates(&self, contours: Vec<Contour>) -> Vec<(Contour, f64)> {
        let mut scored: Vec<(Contour, f64)> = contours
            .into_iter()
            .map(|c| {
                let area = contour_area(&c);
                (c, area)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.config.max_candidates);
        scored
    }

    fn approximate<G: Geometry + ?Sized>(&self, contour: &Contour, geometry: &G) -> Contour {
        let perimeter = contour_perimeter(contour);
        geometry.approximate_polygon(contour, self.config.poly_approx_epsilon * perimeter)
    }
}

fn to_points(contour: &Contour) -> Vec<Point> {
    contour.iter().copied().map(Point::from).collect()
}

/// Enclosed area of a traced contour
pub fn contour_area(contour: &Contour) -> f64 {
    polygon_area(&to_points(contour))
}

/// Closed perimeter of a traced contour
pub fn contour_perimeter(contour: &Contour) -> f64 {
    polygon_perimeter(&to_points(contour))
}
