//! Code-conditioned field extraction
//!
//! A page carrying a machine-readable code is taken as the back face and only
//! its address region is read. Any other page is taken as the front face and
//! every region except the address is read.

use std::collections::BTreeMap;

use image::imageops;
use image::RgbImage;
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::constants::{extraction::MISSING_ADDRESS_NOTE, fields};
use crate::ocr::{adaptive_threshold_gaussian, SegmentationMode, TextRecognizer};
use crate::roi::{RoiLayout, RoiRect};

/// Text read from one page and the regions that were read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldExtraction {
    pub fields: BTreeMap<String, String>,
    pub regions_read: Vec<String>,
}

/// Reads named regions through a [`TextRecognizer`]
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    config: ExtractionConfig,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Names of the regions a page should have read
    pub fn select_regions(code_detected: bool, rois: &RoiLayout) -> Vec<String> {
        if code_detected {
            rois.iter()
                .filter(|(name, _)| *name == fields::ADDRESS)
                .map(|(name, _)| name.to_string())
                .collect()
        } else {
            rois.iter()
                .filter(|(name, _)| *name != fields::ADDRESS)
                .map(|(name, _)| name.to_string())
                .collect()
        }
    }

    /// Read the regions selected by the code-presence policy
    pub fn extract<T: TextRecognizer + ?Sized>(
        &self,
        canvas: &RgbImage,
        code_detected: bool,
        rois: &RoiLayout,
        recognizer: &T,
    ) -> FieldExtraction {
        let mut extraction = FieldExtraction::default();

        if code_detected && !rois.contains(fields::ADDRESS) {
            extraction
                .fields
                .insert(fields::NOTE.to_string(), MISSING_ADDRESS_NOTE.to_string());
            return extraction;
        }

        for name in Self::select_regions(code_detected, rois) {
            let Some(rect) = rois.get(&name) else { continue };
            let text = self.read_region(canvas, rect, recognizer);
            debug!(region = %name, chars = text.len(), "region read");
            extraction.fields.insert(name.clone(), text);
            extraction.regions_read.push(name);
        }
        extraction
    }

    /// Crop, binarize and recognize one region
    ///
    /// Crops below the minimum side length yield an empty string without
    /// calling the recognizer. Recognizer failures also yield an empty string.
    pub fn read_region<T: TextRecognizer + ?Sized>(
        &self,
        canvas: &RgbImage,
        rect: &RoiRect,
        recognizer: &T,
    ) -> String {
        let crop = imageops::crop_imm(canvas, rect.x, rect.y, rect.width, rect.height).to_image();
        if crop.width() < self.config.min_crop_side || crop.height() < self.config.min_crop_side {
            debug!(width = crop.width(), height = crop.height(), "crop too small");
            return String::new();
        }

        let gray = imageops::grayscale(&crop);
        let processed = adaptive_threshold_gaussian(
            &gray,
            self.config.adaptive_window,
            self.config.adaptive_offset,
        );

        let mode = SegmentationMode::from_psm(self.config.page_seg_mode)
            .unwrap_or(SegmentationMode::SingleBlock);
        match recognizer.recognize(&processed, mode) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "text recognition failed, leaving field empty");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::{default_rois, map_rois, RoiDefinition};
    use crate::{Result, ScanError};
    use image::GrayImage;
    use std::cell::RefCell;

    /// Echoes the region size and records each call
    #[derive(Default)]
    struct RecordingRecognizer {
        calls: RefCell<Vec<(u32, u32, SegmentationMode)>>,
    }

    impl TextRecognizer for RecordingRecognizer {
        fn recognize(&self, region: &GrayImage, mode: SegmentationMode) -> Result<String> {
            self.calls
                .borrow_mut()
                .push((region.width(), region.height(), mode));
            Ok(format!("  {}x{}\n", region.width(), region.height()))
        }
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn recognize(&self, _region: &GrayImage, _mode: SegmentationMode) -> Result<String> {
            Err(ScanError::Recognition {
                message: "engine missing".into(),
            })
        }
    }

    #[test]
    fn test_code_page_reads_only_address() {
        let canvas = RgbImage::new(1000, 600);
        let rois = map_rois(&default_rois(), 1000, 600);
        let recognizer = RecordingRecognizer::default();

        let out = FieldExtractor::new().extract(&canvas, true, &rois, &recognizer);

        assert_eq!(out.regions_read, vec!["address"]);
        assert_eq!(out.fields.len(), 1);
        assert_eq!(out.fields["address"], "550x210");
        assert_eq!(recognizer.calls.borrow().len(), 1);
    }

    #[test]
    fn test_front_page_reads_everything_but_address() {
        let canvas = RgbImage::new(1000, 600);
        let rois = map_rois(&default_rois(), 1000, 600);
        let recognizer = RecordingRecognizer::default();

        let out = FieldExtractor::new().extract(&canvas, false, &rois, &recognizer);

        assert_eq!(out.regions_read, vec!["name", "dob", "gender", "aadhaar"]);
        assert!(!out.fields.contains_key("address"));
        assert_eq!(out.fields["name"], "420x30");
        assert!(recognizer
            .calls
            .borrow()
            .iter()
            .all(|(_, _, mode)| *mode == SegmentationMode::SingleBlock));
    }

    #[test]
    fn test_code_page_without_address_roi_gets_note() {
        let canvas = RgbImage::new(1000, 600);
        let defs = vec![RoiDefinition::new("name", 0.3, 0.3, 0.4, 0.1)];
        let rois = map_rois(&defs, 1000, 600);
        let recognizer = RecordingRecognizer::default();

        let out = FieldExtractor::new().extract(&canvas, true, &rois, &recognizer);

        assert_eq!(out.fields.len(), 1);
        assert_eq!(out.fields["note"], "address ROI not defined");
        assert!(out.regions_read.is_empty());
        assert!(recognizer.calls.borrow().is_empty());
    }

    #[test]
    fn test_small_crop_skips_recognizer() {
        let canvas = RgbImage::new(200, 100);
        // 5% of 100 px is a 5 px tall crop
        let defs = vec![RoiDefinition::new("name", 0.1, 0.1, 0.5, 0.05)];
        let rois = map_rois(&defs, 200, 100);
        let recognizer = RecordingRecognizer::default();

        let out = FieldExtractor::new().extract(&canvas, false, &rois, &recognizer);

        assert_eq!(out.fields["name"], "");
        assert_eq!(out.regions_read, vec!["name"]);
        assert!(recognizer.calls.borrow().is_empty());
    }

    #[test]
    fn test_recognizer_failure_degrades_to_empty() {
        let canvas = RgbImage::new(1000, 600);
        let rois = map_rois(&default_rois(), 1000, 600);

        let out = FieldExtractor::new().extract(&canvas, true, &rois, &FailingRecognizer);

        assert_eq!(out.fields["address"], "");
    }

    #[test]
    fn test_select_regions_policy() {
        let rois = map_rois(&default_rois(), 100, 100);
        assert_eq!(FieldExtractor::select_regions(true, &rois), vec!["address"]);
        assert_eq!(FieldExtractor::select_regions(false, &rois).len(), 4);
    }
}
