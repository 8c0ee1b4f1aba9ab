//! Single-page orchestration
//!
//! Runs localization, rectification, code detection, ROI mapping and field
//! extraction in order and folds every outcome into a [`PageResult`].
//! Localization misses and absent codes are ordinary results; only an input
//! that cannot be decoded is an error.

use std::collections::BTreeMap;
use std::path::Path;

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::debug::{labels, roi_overlay, DebugSink};
use crate::detection::{CardLocalizer, CodeScanner, LocalizationMiss, QrCodeScanner};
use crate::extract::FieldExtractor;
use crate::geometry::{Geometry, ImageprocGeometry, Quadrilateral};
use crate::image_loader::{load_image, load_image_from_bytes};
use crate::normalize::PerspectiveNormalizer;
use crate::ocr::{TesseractCli, TextRecognizer};
use crate::roi::map_rois;
use crate::Result;

/// Outcome of processing one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Whether a card outline was found and rectified
    #[serde(rename = "card_found")]
    pub quadrilateral_found: bool,
    /// Why no outline was used; empty when one was
    #[serde(rename = "card_reason")]
    pub miss_reason: String,
    /// Whether a machine-readable code was localized on the rectified card
    #[serde(rename = "qr_detected")]
    pub code_detected: bool,
    /// Decoded code payload, empty when absent or undecodable
    #[serde(rename = "qr_data")]
    pub code_payload: String,
    /// Field name to recognized text
    pub fields: BTreeMap<String, String>,
    /// Regions actually read, in read order
    #[serde(default)]
    pub regions_read: Vec<String>,
    /// Canonical card outline in source coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quadrilateral: Option<Quadrilateral>,
}

impl PageResult {
    /// Field text, empty when the field was not read
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Runs the full pipeline on single pages
///
/// Backends are owned by the processor and only borrowed immutably while a
/// page runs, so one processor can serve pages from several threads when its
/// backends allow it.
pub struct PageProcessor<G = ImageprocGeometry, C = QrCodeScanner, T = TesseractCli> {
    localizer: CardLocalizer,
    normalizer: PerspectiveNormalizer,
    extractor: FieldExtractor,
    config: PipelineConfig,
    geometry: G,
    scanner: C,
    recognizer: T,
}

impl PageProcessor {
    /// Processor with the default `imageproc`, QR and Tesseract backends
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_backends(config, ImageprocGeometry, QrCodeScanner, TesseractCli::new())
    }
}

impl<G, C, T> PageProcessor<G, C, T>
where
    G: Geometry,
    C: CodeScanner,
    T: TextRecognizer,
{
    pub fn with_backends(config: PipelineConfig, geometry: G, scanner: C, recognizer: T) -> Self {
        Self {
            localizer: CardLocalizer::with_config(config.localizer.clone()),
            normalizer: PerspectiveNormalizer::with_config(config.normalizer.clone()),
            extractor: FieldExtractor::with_config(config.extraction.clone()),
            config,
            geometry,
            scanner,
            recognizer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn recognizer(&self) -> &T {
        &self.recognizer
    }

    /// Decode an image file and process it
    pub fn process_file(&self, path: &Path, debug: &dyn DebugSink) -> Result<PageResult> {
        let image = load_image(path)?;
        Ok(self.process(&image, debug))
    }

    /// Decode an encoded image buffer and process it
    pub fn process_bytes(&self, bytes: &[u8], debug: &dyn DebugSink) -> Result<PageResult> {
        let image = load_image_from_bytes(bytes)?;
        Ok(self.process(&image, debug))
    }

    /// Process one decoded page
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process(&self, image: &RgbImage, debug: &dyn DebugSink) -> PageResult {
        if debug.enabled() {
            debug.save(labels::ORIGINAL, &DynamicImage::ImageRgb8(image.clone()));
        }

        // 1) locate and rectify, falling back to the raw image
        let located = self.localizer.locate(image, &self.geometry, debug);
        let (canvas, quadrilateral, miss_reason) = match located {
            Ok(candidate) => {
                let quad = candidate.quadrilateral;
                match self.normalizer.rectify(image, &quad, &self.geometry, debug) {
                    Some(warped) => (warped, Some(quad.canonical()), String::new()),
                    None => {
                        info!("card outline could not be rectified, reading unwarped page");
                        let reason = LocalizationMiss::NoQuadrilateral.to_string();
                        (image.clone(), None, reason)
                    }
                }
            }
            Err(miss) => {
                info!(reason = %miss, "card outline not found, reading unwarped page");
                (image.clone(), None, miss.to_string())
            }
        };

        // 2) optional fixed canvas
        let canvas = self.normalizer.fit_canvas(canvas);
        if debug.enabled() {
            debug.save(labels::WARPED_FINAL, &DynamicImage::ImageRgb8(canvas.clone()));
        }

        // 3) code check on the rectified card
        let code = self.scanner.detect_and_decode(&canvas);
        let code_detected = code.is_some();

        // 4) conditional ROI reads
        let rois = map_rois(&self.config.rois, canvas.width(), canvas.height());
        let extraction = self.extractor.extract(&canvas, code_detected, &rois, &self.recognizer);

        // 5) overlay
        if debug.enabled() {
            let overlay = roi_overlay(
                &canvas,
                code.as_ref().map(|c| &c.corners),
                &rois,
                &extraction.regions_read,
            );
            debug.save(labels::OVERLAY, &DynamicImage::ImageRgb8(overlay));
        }

        info!(
            card_found = quadrilateral.is_some(),
            code_detected,
            fields = extraction.fields.len(),
            "page processed"
        );

        PageResult {
            quadrilateral_found: quadrilateral.is_some(),
            miss_reason,
            code_detected,
            code_payload: code.map(|c| c.payload).unwrap_or_default(),
            fields: extraction.fields,
            regions_read: extraction.regions_read,
            quadrilateral,
        }
    }
}
