//! Lighting normalization ahead of OCR

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

use crate::constants::gaussian_sigma_for_kernel;

/// Binarize against a Gaussian-weighted local mean
///
/// A pixel becomes white when it is brighter than the weighted mean of its
/// `window` x `window` neighbourhood minus `offset`, black otherwise.
pub fn adaptive_threshold_gaussian(gray: &GrayImage, window: u32, offset: i32) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    let sigma = gaussian_sigma_for_kernel(window.max(3));
    let local_mean = gaussian_blur_f32(gray, sigma);

    let mut out = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let threshold = local_mean.get_pixel(x, y).0[0] as i32 - offset;
        let value = if pixel.0[0] as i32 > threshold { 255 } else { 0 };
        out.put_pixel(x, y, Luma([value]));
    }
    out
}
