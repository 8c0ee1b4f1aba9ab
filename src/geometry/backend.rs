//! Geometry primitives consumed by the pipeline
//!
//! The localizer and normalizer only depend on the [`Geometry`] trait. The
//! default [`ImageprocGeometry`] backend is built on `imageproc`.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::edges::canny;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point as PixelPoint;

use super::Quadrilateral;

/// A traced contour in pixel coordinates
pub type Contour = Vec<PixelPoint<i32>>;

/// Edge, contour, polygon and warp primitives
pub trait Geometry {
    /// Binary edge map (255 = edge) using hysteresis thresholds
    fn edge_map(&self, gray: &GrayImage, low: f32, high: f32) -> GrayImage;

    /// Outermost contours only; nested borders are dropped
    fn external_contours(&self, edges: &GrayImage) -> Vec<Contour>;

    /// Simplify a closed contour with the given distance tolerance
    fn approximate_polygon(&self, contour: &[PixelPoint<i32>], epsilon: f64) -> Contour;

    /// Map `quad` (TL, TR, BR, BL) onto a `width` x `height` upright rectangle
    ///
    /// Returns `None` when the mapping is degenerate.
    fn warp_perspective(
        &self,
        image: &RgbImage,
        quad: &Quadrilateral,
        width: u32,
        height: u32,
    ) -> Option<RgbImage>;
}

/// `imageproc` implementation of the geometry primitives
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocGeometry;

impl Geometry for ImageprocGeometry {
    fn edge_map(&self, gray: &GrayImage, low: f32, high: f32) -> GrayImage {
        canny(gray, low, high)
    }

    fn external_contours(&self, edges: &GrayImage) -> Vec<Contour> {
        find_contours::<i32>(edges)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| c.points)
            .collect()
    }

    fn approximate_polygon(&self, contour: &[PixelPoint<i32>], epsilon: f64) -> Contour {
        if contour.len() < 3 || epsilon <= 0.0 {
            return contour.to_vec();
        }

        // Split the closed curve at the vertex farthest from the start so each
        // half is an open arc with well separated endpoints.
        let start = contour[0];
        let split = contour
            .iter()
            .enumerate()
            .max_by_key(|(_, p)| {
                let dx = (p.x - start.x) as i64;
                let dy = (p.y - start.y) as i64;
                dx * dx + dy * dy
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        if split == 0 {
            return vec![start];
        }

        let first = approximate_polygon_dp(&contour[..=split], epsilon, false);
        let mut second_arc = contour[split..].to_vec();
        second_arc.push(start);
        let second = approximate_polygon_dp(&second_arc, epsilon, false);

        let mut polygon = first;
        // second starts at the split vertex and ends back at start
        polygon.extend(second.iter().skip(1));
        polygon.pop();
        polygon.dedup();
        polygon
    }

    fn warp_perspective(
        &self,
        image: &RgbImage,
        quad: &Quadrilateral,
        width: u32,
        height: u32,
    ) -> Option<RgbImage> {
        if width == 0 || height == 0 {
            return None;
        }
        let src = quad.corners.map(|p| (p.x, p.y));
        let (w, h) = ((width - 1) as f32, (height - 1) as f32);
        let dst = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

        let projection = Projection::from_control_points(src, dst)?;
        let mut output = RgbImage::new(width, height);
        warp_into(
            image,
            &projection,
            Interpolation::Bicubic,
            Rgb([0, 0, 0]),
            &mut output,
        );
        Some(output)
    }
}
