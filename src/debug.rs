//! Best-effort persistence of intermediate pipeline images
//!
//! Debug output never influences a page result: sinks swallow their own
//! failures after logging them.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::geometry::{Contour, Point};
use crate::roi::RoiLayout;

/// Stage labels, numbered in pipeline order
pub mod labels {
    pub const ORIGINAL: &str = "0_original";
    pub const EDGES: &str = "1_edges";
    pub const CONTOURS: &str = "2_contours";
    pub const WARPED: &str = "3_warped";
    pub const WARPED_FINAL: &str = "4_warped_final";
    pub const OVERLAY: &str = "5_overlay";
}

const CANDIDATE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const SELECTED_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CODE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const MISSING_CODE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const ROI_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Receiver for intermediate images
pub trait DebugSink {
    /// Whether images are kept at all; callers skip building overlays otherwise
    fn enabled(&self) -> bool {
        true
    }

    /// Persist one image. Must not panic or propagate failures.
    fn save(&self, label: &str, image: &DynamicImage);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDebugSink;

impl DebugSink for NoopDebugSink {
    fn enabled(&self) -> bool {
        false
    }

    fn save(&self, _label: &str, _image: &DynamicImage) {}
}

/// Writes `<stem>_<label>.png` files into a directory
#[derive(Debug, Clone)]
pub struct DirectoryDebugSink {
    dir: PathBuf,
    stem: String,
}

impl DirectoryDebugSink {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an image with `label` is written to
    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.png", self.stem, label))
    }
}

impl DebugSink for DirectoryDebugSink {
    fn save(&self, label: &str, image: &DynamicImage) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "failed to create debug directory");
            return;
        }
        let path = self.path_for(label);
        match image.save(&path) {
            Ok(()) => debug!(path = %path.display(), "saved debug image"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to save debug image"),
        }
    }
}

/// Draw a closed polyline with the given stroke width
pub fn draw_polygon(canvas: &mut RgbImage, points: &[Point], color: Rgb<u8>, thickness: u32) {
    if points.len() < 2 {
        return;
    }
    let half = thickness as f32 / 2.0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        let mut offset = -half;
        while offset <= half {
            draw_line_segment_mut(canvas, (p.x + offset, p.y), (q.x + offset, q.y), color);
            draw_line_segment_mut(canvas, (p.x, p.y + offset), (q.x, q.y + offset), color);
            offset += 1.0;
        }
    }
}

/// Examined contour approximations in yellow, the accepted one in green
pub fn contour_overlay(
    base: &RgbImage,
    candidates: &[Contour],
    selected: Option<usize>,
) -> RgbImage {
    let mut canvas = base.clone();
    for (i, candidate) in candidates.iter().enumerate() {
        let points: Vec<Point> = candidate.iter().copied().map(Point::from).collect();
        if Some(i) == selected {
            draw_polygon(&mut canvas, &points, SELECTED_COLOR, 4);
        } else {
            draw_polygon(&mut canvas, &points, CANDIDATE_COLOR, 3);
        }
    }
    canvas
}

/// Code outline plus the ROI boxes that were read
///
/// Outcomes are told apart by color rather than text: a found code is
/// outlined in blue, a missing one marked by a red square in the top-left
/// corner, and read regions are boxed in green. When `active` is empty every
/// ROI is drawn.
pub fn roi_overlay(
    base: &RgbImage,
    code_corners: Option<&[Point; 4]>,
    rois: &RoiLayout,
    active: &[String],
) -> RgbImage {
    let mut canvas = base.clone();

    match code_corners {
        Some(corners) => draw_polygon(&mut canvas, corners, CODE_COLOR, 3),
        None => {
            // no code: mark the top-left corner
            let side = 24.min(canvas.width()).min(canvas.height());
            if side > 0 {
                draw_hollow_rect_mut(
                    &mut canvas,
                    Rect::at(0, 0).of_size(side, side),
                    MISSING_CODE_COLOR,
                );
            }
        }
    }

    for (name, rect) in rois.iter() {
        if !active.is_empty() && !active.iter().any(|a| a == name) {
            continue;
        }
        for inset in 0..2u32 {
            if rect.width > 2 * inset && rect.height > 2 * inset {
                draw_hollow_rect_mut(
                    &mut canvas,
                    Rect::at((rect.x + inset) as i32, (rect.y + inset) as i32)
                        .of_size(rect.width - 2 * inset, rect.height - 2 * inset),
                    ROI_COLOR,
                );
            }
        }
    }

    canvas
}

/// File name of the combined front/back preview inside a debug directory
pub const PREVIEW_FILE: &str = "output.png";

/// Scale to `target_height` keeping the aspect ratio
///
/// Shrinking uses a triangle filter, enlarging Catmull-Rom.
pub fn resize_to_height(image: &RgbImage, target_height: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || h == target_height {
        return image.clone();
    }
    let scale = target_height as f64 / h as f64;
    let new_width = ((w as f64 * scale).round() as u32).max(1);
    let filter = if scale < 1.0 {
        FilterType::Triangle
    } else {
        FilterType::CatmullRom
    };
    imageops::resize(image, new_width, target_height, filter)
}

/// Front and back next to each other at the taller of the two heights
pub fn side_by_side(front: &RgbImage, back: &RgbImage) -> RgbImage {
    let height = front.height().max(back.height());
    let left = resize_to_height(front, height);
    let right = resize_to_height(back, height);

    let mut combined = RgbImage::new(left.width() + right.width(), height);
    imageops::replace(&mut combined, &left, 0, 0);
    imageops::replace(&mut combined, &right, left.width() as i64, 0);
    combined
}

/// Write the combined preview into `dir`, logging instead of failing
pub fn save_preview(dir: &Path, front: &RgbImage, back: &RgbImage) -> Option<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), error = %e, "failed to create debug directory");
        return None;
    }
    let path = dir.join(PREVIEW_FILE);
    match side_by_side(front, back).save(&path) {
        Ok(()) => {
            debug!(path = %path.display(), "saved front/back preview");
            Some(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to save front/back preview");
            None
        }
    }
}
