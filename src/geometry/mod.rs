//! Planar geometry shared by localization and rectification
//!
//! Holds the [`Quadrilateral`] model of a card outline together with the
//! black-box [`Geometry`] primitives the pipeline consumes.

pub mod backend;

pub use backend::{Contour, Geometry, ImageprocGeometry};

use serde::{Deserialize, Serialize};

/// A point in source image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<imageproc::point::Point<i32>> for Point {
    fn from(p: imageproc::point::Point<i32>) -> Self {
        Self::new(p.x as f32, p.y as f32)
    }
}

/// Four corner points of a card outline
///
/// Corners are stored in whatever order they were produced. Call
/// [`Quadrilateral::canonical`] to get them as top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub corners: [Point; 4],
}

impl Quadrilateral {
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Order corners as TL, TR, BR, BL
    ///
    /// Top-left has the smallest `x + y` and bottom-right the largest.
    /// Top-right has the smallest `y - x` and bottom-left the largest.
    /// Ties resolve to the earliest corner.
    pub fn canonical(&self) -> Quadrilateral {
        let sum = |p: &Point| p.x + p.y;
        let diff = |p: &Point| p.y - p.x;

        let tl = self.corners[arg_extreme(&self.corners, sum, false)];
        let br = self.corners[arg_extreme(&self.corners, sum, true)];
        let tr = self.corners[arg_extreme(&self.corners, diff, false)];
        let bl = self.corners[arg_extreme(&self.corners, diff, true)];

        Quadrilateral::new([tl, tr, br, bl])
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    /// Rectified output size for a canonically ordered quadrilateral
    ///
    /// Width is the longer of the top and bottom edges, height the longer of the
    /// left and right edges. Both are truncated to whole pixels.
    pub fn output_size(&self) -> (u32, u32) {
        let [tl, tr, br, bl] = self.corners;

        let width = tr.distance(&tl).max(br.distance(&bl));
        let height = tr.distance(&br).max(tl.distance(&bl));

        (width as u32, height as u32)
    }

    /// Enclosed area (shoelace formula)
    pub fn area(&self) -> f64 {
        polygon_area(&self.corners)
    }
}

fn arg_extreme(points: &[Point; 4], key: impl Fn(&Point) -> f32, max: bool) -> usize {
    let mut best = 0;
    for i in 1..points.len() {
        let better = if max {
            key(&points[i]) > key(&points[best])
        } else {
            key(&points[i]) < key(&points[best])
        };
        if better {
            best = i;
        }
    }
    best
}

/// Absolute enclosed area of a closed polygon
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    twice_area.abs() / 2.0
}

/// Perimeter of a closed polygon
pub fn polygon_perimeter(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .enumerate()
        .map(|(i, p)| p.distance(&points[(i + 1) % points.len()]) as f64)
        .sum()
}
