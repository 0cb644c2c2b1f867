use crate::shared::constants::{CLASS_COLORS, CLASS_NAMES};

/// One detected region in frame pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub class_id: usize,
    pub score: f64,
}

impl Detection {
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Human-readable class name; out-of-range ids fall back to `class <id>`.
    pub fn label(&self) -> String {
        CLASS_NAMES
            .get(self.class_id)
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("class {}", self.class_id))
    }

    /// Overlay color for this class (RGB), cycled for out-of-range ids.
    pub fn color(&self) -> [u8; 3] {
        CLASS_COLORS[self.class_id % CLASS_COLORS.len()]
    }

    pub fn iou(&self, other: &Detection) -> f64 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width() * self.height();
        let area_b = other.width() * other.height();
        inter / (area_a + area_b - inter)
    }
}
