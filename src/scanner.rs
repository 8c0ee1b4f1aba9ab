//! Front/back card scanning
//!
//! Processes the front page to completion, then the back page, then merges
//! both into one [`DemographicRecord`].

use std::cell::RefCell;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::aggregate::{aggregate, DemographicRecord};
use crate::debug::{labels, save_preview, DebugSink, DirectoryDebugSink, NoopDebugSink};
use crate::detection::CodeScanner;
use crate::geometry::Geometry;
use crate::image_loader::load_image;
use crate::ocr::TextRecognizer;
use crate::pipeline::{PageProcessor, PageResult};
use crate::Result;
use image::{DynamicImage, RgbImage};

/// Merged record plus the per-page results it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub extracted: DemographicRecord,
    pub front: PageResult,
    pub back: PageResult,
}

/// Scans both faces of a card with one [`PageProcessor`]
pub struct CardScanner<G, C, T> {
    processor: PageProcessor<G, C, T>,
}

impl<G, C, T> CardScanner<G, C, T>
where
    G: Geometry,
    C: CodeScanner,
    T: TextRecognizer,
{
    pub fn new(processor: PageProcessor<G, C, T>) -> Self {
        Self { processor }
    }

    pub fn processor(&self) -> &PageProcessor<G, C, T> {
        &self.processor
    }

    /// Scan two decoded pages
    pub fn scan(
        &self,
        front: &RgbImage,
        back: &RgbImage,
        front_debug: &dyn DebugSink,
        back_debug: &dyn DebugSink,
    ) -> ScanReport {
        let front = self.processor.process(front, front_debug);
        let back = self.processor.process(back, back_debug);
        let extracted = aggregate(&[front.clone(), back.clone()]);
        ScanReport {
            extracted,
            front,
            back,
        }
    }

    /// Decode and scan two image files
    ///
    /// Both files are decoded before any page is processed, so a decode
    /// failure on either face aborts without partial work. With `debug_dir`
    /// set, intermediate images are written there as `front_*` and `back_*`,
    /// plus both overlays side by side as `output.png`.
    #[instrument(skip_all, fields(front = %front.display(), back = %back.display()))]
    pub fn scan_files(
        &self,
        front: &Path,
        back: &Path,
        debug_dir: Option<&Path>,
    ) -> Result<ScanReport> {
        let front_image = load_image(front)?;
        let back_image = load_image(back)?;

        let Some(dir) = debug_dir else {
            return Ok(self.scan(&front_image, &back_image, &NoopDebugSink, &NoopDebugSink));
        };

        let front_sink = OverlayCapture::new(DirectoryDebugSink::new(dir, "front"));
        let back_sink = OverlayCapture::new(DirectoryDebugSink::new(dir, "back"));
        let report = self.scan(&front_image, &back_image, &front_sink, &back_sink);

        if let (Some(front), Some(back)) = (front_sink.into_overlay(), back_sink.into_overlay()) {
            save_preview(dir, &front, &back);
        }
        Ok(report)
    }
}

/// Forwards to another sink and keeps the final overlay
struct OverlayCapture<S> {
    inner: S,
    overlay: RefCell<Option<RgbImage>>,
}

impl<S: DebugSink> OverlayCapture<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            overlay: RefCell::new(None),
        }
    }

    fn into_overlay(self) -> Option<RgbImage> {
        self.overlay.into_inner()
    }
}

impl<S: DebugSink> DebugSink for OverlayCapture<S> {
    fn enabled(&self) -> bool {
        true
    }

    fn save(&self, label: &str, image: &DynamicImage) {
        if label == labels::OVERLAY {
            *self.overlay.borrow_mut() = Some(image.to_rgb8());
        }
        if self.inner.enabled() {
            self.inner.save(label, image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::detection::CodeDetection;
    use crate::geometry::{ImageprocGeometry, Point};
    use crate::ocr::SegmentationMode;
    use crate::ScanError;
    use image::{GrayImage, Rgb};

    /// Reports a code only on images whose top-left pixel is white
    struct MarkerCode;

    impl CodeScanner for MarkerCode {
        fn detect_and_decode(&self, image: &RgbImage) -> Option<CodeDetection> {
            (*image.get_pixel(0, 0) == Rgb([255, 255, 255])).then(|| CodeDetection {
                payload: "payload".into(),
                corners: [Point::new(0.0, 0.0); 4],
            })
        }
    }

    struct Constant;

    impl TextRecognizer for Constant {
        fn recognize(&self, _region: &GrayImage, _mode: SegmentationMode) -> crate::Result<String> {
            Ok("TEXT".into())
        }
    }

    fn scanner() -> CardScanner<ImageprocGeometry, MarkerCode, Constant> {
        CardScanner::new(PageProcessor::with_backends(
            PipelineConfig::default(),
            ImageprocGeometry,
            MarkerCode,
            Constant,
        ))
    }

    #[test]
    fn test_scan_merges_front_and_back() {
        let front = RgbImage::new(400, 250);
        let mut back = RgbImage::new(400, 250);
        back.put_pixel(0, 0, Rgb([255, 255, 255]));

        let report = scanner().scan(&front, &back, &NoopDebugSink, &NoopDebugSink);

        assert!(!report.front.code_detected);
        assert!(report.back.code_detected);
        assert_eq!(report.extracted.name, "TEXT");
        assert_eq!(report.extracted.address, "TEXT");
        assert_eq!(report.back.code_payload, "payload");
    }

    #[test]
    fn test_scan_files_writes_debug_images() {
        let dir = tempfile::tempdir().unwrap();
        let front_path = dir.path().join("front.png");
        let back_path = dir.path().join("back.png");
        RgbImage::new(120, 80).save(&front_path).unwrap();
        RgbImage::new(120, 80).save(&back_path).unwrap();
        let debug_dir = dir.path().join("debug");

        let report = scanner()
            .scan_files(&front_path, &back_path, Some(&debug_dir))
            .unwrap();

        assert!(!report.front.quadrilateral_found);
        assert!(debug_dir.join("front_0_original.png").exists());
        assert!(debug_dir.join("back_5_overlay.png").exists());
    }

    #[test]
    fn test_scan_files_writes_combined_preview() {
        let dir = tempfile::tempdir().unwrap();
        let front_path = dir.path().join("front.png");
        let back_path = dir.path().join("back.png");
        RgbImage::new(120, 80).save(&front_path).unwrap();
        RgbImage::new(60, 40).save(&back_path).unwrap();
        let debug_dir = dir.path().join("debug");

        scanner()
            .scan_files(&front_path, &back_path, Some(&debug_dir))
            .unwrap();

        // back overlay is scaled up to the front height
        let preview = image::open(debug_dir.join(crate::debug::PREVIEW_FILE)).unwrap();
        assert_eq!((preview.width(), preview.height()), (240, 80));
    }

    #[test]
    fn test_scan_files_without_debug_dir_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let front_path = dir.path().join("front.png");
        RgbImage::new(120, 80).save(&front_path).unwrap();

        scanner().scan_files(&front_path, &front_path, None).unwrap();

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_scan_files_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let front_path = dir.path().join("front.png");
        std::fs::write(&front_path, b"not a png").unwrap();

        let err = scanner()
            .scan_files(&front_path, &front_path, None)
            .unwrap_err();
        assert!(matches!(err, ScanError::ImageDecode { .. }));
    }
}
