//! Configuration structures for the card scanning pipeline.
//!
//! This module defines all tunable parameters for card scanning,
//! organized into groups for localization, rectification, regions of interest
//! and text extraction.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use scan_idcard::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), scan_idcard::ScanError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`LocalizerConfig`]: Edge detection and contour selection
//! - [`NormalizerConfig`]: Fixed-canvas resize toggle
//! - [`RoiDefinition`]: Fractional field regions
//! - [`ExtractionConfig`]: Per-region binarization and OCR hints

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{extraction, localizer, normalizer};
use crate::roi::{default_rois, RoiDefinition};
use crate::{Result, ScanError};

/// Complete pipeline configuration.
///
/// Read-only once a processor is built; the same configuration can serve any
/// number of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Card localization configuration
    #[serde(default)]
    pub localizer: LocalizerConfig,

    /// Rectification configuration
    #[serde(default)]
    pub normalizer: NormalizerConfig,

    /// Field regions as fractions of the rectified card
    #[serde(default = "default_rois")]
    pub rois: Vec<RoiDefinition>,

    /// Per-region text extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Card localization parameters.
///
/// Controls the edge detection and contour analysis used to locate
/// the card outline in the raw image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizerConfig {
    /// Minimum card area as fraction of image (0.0-1.0)
    pub min_area_ratio: f64,

    /// Canny edge detection low threshold
    pub canny_low_threshold: f32,

    /// Canny edge detection high threshold
    pub canny_high_threshold: f32,

    /// Gaussian blur kernel size (must be odd)
    pub blur_kernel_size: u32,

    /// Number of largest contours examined
    pub max_candidates: usize,

    /// Polygon approximation epsilon as fraction of perimeter
    pub poly_approx_epsilon: f64,
}

/// Rectification parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Resize every rectified card to `target_size`
    pub use_fixed_canvas: bool,

    /// Fixed canvas (width, height)
    pub target_size: (u32, u32),
}

/// Per-region text extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Crops with a side below this many pixels are skipped
    pub min_crop_side: u32,

    /// Adaptive threshold window (odd)
    pub adaptive_window: u32,

    /// Adaptive threshold offset
    pub adaptive_offset: i32,

    /// Tesseract page segmentation mode
    pub page_seg_mode: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            localizer: LocalizerConfig::default(),
            normalizer: NormalizerConfig::default(),
            rois: default_rois(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: localizer::MIN_CARD_AREA_RATIO,
            canny_low_threshold: localizer::CANNY_LOW_THRESHOLD,
            canny_high_threshold: localizer::CANNY_HIGH_THRESHOLD,
            blur_kernel_size: localizer::GAUSS_BLUR_KSIZE,
            max_candidates: localizer::MAX_CANDIDATES,
            poly_approx_epsilon: localizer::POLY_APPROX_EPSILON,
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            use_fixed_canvas: normalizer::USE_FIXED_CANVAS,
            target_size: normalizer::TARGET_SIZE,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_crop_side: extraction::MIN_CROP_SIDE,
            adaptive_window: extraction::ADAPTIVE_WINDOW,
            adaptive_offset: extraction::ADAPTIVE_OFFSET,
            page_seg_mode: extraction::PAGE_SEG_MODE,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScanError::config(format!("cannot read {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ScanError::config(format!("cannot parse {}", path.display()), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ScanError::config("cannot serialize configuration", e))?;
        std::fs::write(path, json)
            .map_err(|e| ScanError::config(format!("cannot write {}", path.display()), e))?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let loc = &self.localizer;
        if !(0.0..=1.0).contains(&loc.min_area_ratio) {
            return Err(ScanError::invalid_parameter(
                "localizer.min_area_ratio",
                loc.min_area_ratio,
            ));
        }
        if loc.canny_low_threshold > loc.canny_high_threshold {
            return Err(ScanError::invalid_parameter(
                "localizer.canny_low_threshold",
                loc.canny_low_threshold,
            ));
        }
        if loc.blur_kernel_size % 2 == 0 {
            return Err(ScanError::invalid_parameter(
                "localizer.blur_kernel_size",
                loc.blur_kernel_size,
            ));
        }
        if loc.max_candidates == 0 {
            return Err(ScanError::invalid_parameter("localizer.max_candidates", 0));
        }
        if loc.poly_approx_epsilon <= 0.0 {
            return Err(ScanError::invalid_parameter(
                "localizer.poly_approx_epsilon",
                loc.poly_approx_epsilon,
            ));
        }

        let (w, h) = self.normalizer.target_size;
        if self.normalizer.use_fixed_canvas && (w == 0 || h == 0) {
            return Err(ScanError::invalid_parameter(
                "normalizer.target_size",
                format!("{}x{}", w, h),
            ));
        }

        let ext = &self.extraction;
        if ext.adaptive_window < 3 || ext.adaptive_window % 2 == 0 {
            return Err(ScanError::invalid_parameter(
                "extraction.adaptive_window",
                ext.adaptive_window,
            ));
        }
        if crate::ocr::SegmentationMode::from_psm(ext.page_seg_mode).is_none() {
            return Err(ScanError::invalid_parameter("extraction.page_seg_mode", ext.page_seg_mode));
        }

        for roi in &self.rois {
            let parts = [roi.x, roi.y, roi.width, roi.height];
            if parts.iter().any(|v| !(0.0..=1.0).contains(v)) {
                return Err(ScanError::invalid_parameter(
                    format!("rois.{}", roi.name),
                    format!("{:?}", parts),
                ));
            }
        }
        Ok(())
    }
}
