//! Text recognition seam
//!
//! The pipeline reads text through [`TextRecognizer`]; [`TesseractCli`] is the
//! shipped backend.

pub mod preprocess;
pub mod tesseract;

pub use preprocess::adaptive_threshold_gaussian;
pub use tesseract::TesseractCli;

use image::GrayImage;

use crate::Result;

/// Layout hint passed to the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationMode {
    /// Fully automatic page segmentation
    Auto,
    /// A single uniform block of text
    SingleBlock,
    /// A single text line
    SingleLine,
    /// Sparse text in no particular order
    SparseText,
}

impl SegmentationMode {
    /// Tesseract `--psm` value
    pub fn psm(&self) -> u32 {
        match self {
            SegmentationMode::Auto => 3,
            SegmentationMode::SingleBlock => 6,
            SegmentationMode::SingleLine => 7,
            SegmentationMode::SparseText => 11,
        }
    }

    pub fn from_psm(psm: u32) -> Option<Self> {
        match psm {
            3 => Some(SegmentationMode::Auto),
            6 => Some(SegmentationMode::SingleBlock),
            7 => Some(SegmentationMode::SingleLine),
            11 => Some(SegmentationMode::SparseText),
            _ => None,
        }
    }
}

/// Recognizes text inside an already cropped and binarized region
pub trait TextRecognizer {
    fn recognize(&self, region: &GrayImage, mode: SegmentationMode) -> Result<String>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, region: &GrayImage, mode: SegmentationMode) -> Result<String> {
        (**self).recognize(region, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psm_round_trip() {
        for mode in [
            SegmentationMode::Auto,
            SegmentationMode::SingleBlock,
            SegmentationMode::SingleLine,
            SegmentationMode::SparseText,
        ] {
            assert_eq!(SegmentationMode::from_psm(mode.psm()), Some(mode));
        }
        assert_eq!(SegmentationMode::from_psm(42), None);
    }
}
