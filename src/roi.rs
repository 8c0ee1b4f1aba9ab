//! Percentage-based regions of interest
//!
//! Regions are defined as fractions of the rectified card so they apply to
//! any canvas size. [`map_rois`] turns them into clamped pixel rectangles.

use serde::{Deserialize, Serialize};

use crate::constants::fields;

/// Named fractional rectangle, all components in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiDefinition {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RoiDefinition {
    pub fn new(name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Absolute rectangle on a `canvas_width` x `canvas_height` canvas
    ///
    /// Origin is clamped into the canvas, size into `[1, remaining]`.
    pub fn to_rect(&self, canvas_width: u32, canvas_height: u32) -> RoiRect {
        let (cw, ch) = (canvas_width as i64, canvas_height as i64);

        let x = (cw as f64 * self.x) as i64;
        let y = (ch as f64 * self.y) as i64;
        let w = (cw as f64 * self.width) as i64;
        let h = (ch as f64 * self.height) as i64;

        let x = x.min(cw - 1).max(0);
        let y = y.min(ch - 1).max(0);
        let w = w.min(cw - x).max(1);
        let h = h.min(ch - y).max(1);

        RoiRect {
            x: x as u32,
            y: y as u32,
            width: w as u32,
            height: h as u32,
        }
    }
}

/// Default card layout: name, date of birth, gender, identifier number, address
pub fn default_rois() -> Vec<RoiDefinition> {
    vec![
        RoiDefinition::new(fields::NAME, 0.34, 0.34, 0.42, 0.05),
        RoiDefinition::new(fields::DOB, 0.53, 0.38, 0.20, 0.09),
        RoiDefinition::new(fields::GENDER, 0.40, 0.45, 0.14, 0.05),
        RoiDefinition::new(fields::AADHAAR, 0.28, 0.83, 0.50, 0.10),
        RoiDefinition::new(fields::ADDRESS, 0.02, 0.43, 0.55, 0.35),
    ]
}

/// Absolute pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Pixel rectangles for one canvas, in definition order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoiLayout {
    rects: Vec<(String, RoiRect)>,
}

impl RoiLayout {
    pub fn get(&self, name: &str) -> Option<&RoiRect> {
        self.rects.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RoiRect)> {
        self.rects.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Map every definition onto the current canvas
pub fn map_rois(definitions: &[RoiDefinition], canvas_width: u32, canvas_height: u32) -> RoiLayout {
    RoiLayout {
        rects: definitions
            .iter()
            .map(|d| (d.name.clone(), d.to_rect(canvas_width, canvas_height)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name_roi() {
        let rect = RoiDefinition::new("name", 0.34, 0.34, 0.42, 0.05).to_rect(1000, 600);
        assert_eq!(
            rect,
            RoiRect {
                x: 340,
                y: 204,
                width: 420,
                height: 30
            }
        );
    }

    #[test]
    fn test_overflowing_roi_is_clamped() {
        let rect = RoiDefinition::new("edge", 0.9, 0.95, 0.5, 0.5).to_rect(100, 40);
        assert_eq!(rect.x, 90);
        assert_eq!(rect.y, 38);
        assert_eq!(rect.width, 10);
        assert_eq!(rect.height, 2);
    }

    #[test]
    fn test_out_of_range_fractions_stay_inside() {
        let rect = RoiDefinition::new("odd", -0.5, 1.5, 0.0, -1.0).to_rect(80, 60);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 59);
        assert_eq!(rect.width, 1);
        assert_eq!(rect.height, 1);
    }

    #[test]
    fn test_clamping_holds_for_many_canvases() {
        let fractions = [0.0, 0.02, 0.33, 0.5, 0.83, 0.99, 1.0, 1.2];
        for (cw, ch) in [(1, 1), (2, 3), (37, 11), (640, 480), (2480, 1550)] {
            for &fx in &fractions {
                for &fw in &fractions {
                    let rect = RoiDefinition::new("r", fx, 1.0 - fx, fw, fw).to_rect(cw, ch);
                    assert!(rect.x + rect.width <= cw, "{:?} on {}x{}", rect, cw, ch);
                    assert!(rect.y + rect.height <= ch, "{:?} on {}x{}", rect, cw, ch);
                    assert!(rect.width >= 1 && rect.height >= 1);
                }
            }
        }
    }

    #[test]
    fn test_layout_preserves_order_and_lookup() {
        let layout = map_rois(&default_rois(), 1000, 600);
        let names: Vec<&str> = layout.iter().map(|(n, _)| n).collect();

        assert_eq!(names, vec!["name", "dob", "gender", "aadhaar", "address"]);
        assert!(layout.contains("address"));
        assert!(layout.get("phone").is_none());
        assert_eq!(layout.len(), 5);
    }
}
