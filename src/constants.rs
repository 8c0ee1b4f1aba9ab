//! Detection thresholds and reference values for card scanning
//!
//! Compile-time defaults for every tunable stage. [`crate::config::PipelineConfig`]
//! starts from these values.

/// Card localization parameters
pub mod localizer {
    /// Minimum card area as fraction of the whole image
    pub const MIN_CARD_AREA_RATIO: f64 = 0.20;

    /// Canny edge detection thresholds
    pub const CANNY_LOW_THRESHOLD: f32 = 75.0;
    pub const CANNY_HIGH_THRESHOLD: f32 = 200.0;

    /// Gaussian blur kernel size (odd)
    pub const GAUSS_BLUR_KSIZE: u32 = 5;

    /// Only the largest contours are examined
    pub const MAX_CANDIDATES: usize = 7;

    /// Polygon approximation epsilon as fraction of perimeter
    pub const POLY_APPROX_EPSILON: f64 = 0.02;
}

/// Rectification parameters
pub mod normalizer {
    /// Resize the warped card to a fixed canvas
    pub const USE_FIXED_CANVAS: bool = false;

    /// Fixed canvas (width, height), only used when enabled
    pub const TARGET_SIZE: (u32, u32) = (2480, 1550);
}

/// Per-region text extraction parameters
pub mod extraction {
    /// Crops narrower or shorter than this are not sent to OCR
    pub const MIN_CROP_SIDE: u32 = 10;

    /// Adaptive threshold neighbourhood (odd)
    pub const ADAPTIVE_WINDOW: u32 = 35;

    /// Constant subtracted from the weighted local mean
    pub const ADAPTIVE_OFFSET: i32 = 15;

    /// Tesseract page segmentation mode: assume a single uniform block of text
    pub const PAGE_SEG_MODE: u32 = 6;

    /// Default OCR language
    pub const LANGUAGE: &str = "eng";

    /// Note written when a code page has no address region configured
    pub const MISSING_ADDRESS_NOTE: &str = "address ROI not defined";
}

/// Field keys shared by ROI definitions, page results and the merged record
pub mod fields {
    pub const NAME: &str = "name";
    pub const DOB: &str = "dob";
    pub const GENDER: &str = "gender";
    pub const AADHAAR: &str = "aadhaar";
    pub const ADDRESS: &str = "address";
    pub const NOTE: &str = "note";

    /// Fields read from the face without a code
    pub const DEMOGRAPHIC: [&str; 4] = [NAME, DOB, AADHAAR, GENDER];
}

/// Localization miss reasons recorded in page results
pub mod reasons {
    pub const NO_CONTOURS: &str = "no contours";
    pub const NO_QUADRILATERAL: &str = "no 4-corner polygon above area threshold";
}

/// Sigma OpenCV derives for a Gaussian kernel of `ksize` when sigma is left at zero
pub fn gaussian_sigma_for_kernel(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_ranges() {
        assert!(localizer::CANNY_LOW_THRESHOLD < localizer::CANNY_HIGH_THRESHOLD);
        assert!(localizer::MIN_CARD_AREA_RATIO > 0.0 && localizer::MIN_CARD_AREA_RATIO < 1.0);
        assert_eq!(localizer::GAUSS_BLUR_KSIZE % 2, 1);
        assert_eq!(extraction::ADAPTIVE_WINDOW % 2, 1);
    }

    #[test]
    fn test_gaussian_sigma_matches_opencv() {
        assert!((gaussian_sigma_for_kernel(5) - 1.1).abs() < 1e-6);
        assert!((gaussian_sigma_for_kernel(35) - 5.6).abs() < 1e-5);
    }

    #[test]
    fn test_fixed_canvas_is_landscape() {
        let (w, h) = normalizer::TARGET_SIZE;
        assert!(w >= h);
        assert!(!normalizer::USE_FIXED_CANVAS);
    }
}
