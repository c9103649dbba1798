//! Normalized selection rectangles

use super::point::{NormalizedPoint, clamp_unit};

/// Selections narrower or shorter than this (in normalized units) are taps, not drags
pub const MIN_RECT_SIDE: f32 = 0.02;

/// Axis-aligned rectangle in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedRect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl NormalizedRect {
    /// Create a rectangle; negative sizes are clamped to zero
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    /// Zero-size rectangle anchored at `p`
    pub fn at(p: NormalizedPoint) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    /// Bounding box of two corner points, in any order
    pub fn from_corners(a: NormalizedPoint, b: NormalizedPoint) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Top-left corner
    pub fn origin(&self) -> NormalizedPoint {
        NormalizedPoint {
            x: self.x,
            y: self.y,
        }
    }

    /// Whether the point lies inside (edges included)
    pub fn contains(&self, p: &NormalizedPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Whether either side is under [`MIN_RECT_SIDE`]
    pub fn is_too_small(&self) -> bool {
        self.w < MIN_RECT_SIDE || self.h < MIN_RECT_SIDE
    }

    /// Move the top-left corner to `(x, y)`, keeping the size and staying inside the unit square
    pub fn translated_to(&self, x: f32, y: f32) -> Self {
        let max_x = (1.0 - self.w).max(0.0);
        let max_y = (1.0 - self.h).max(0.0);
        Self {
            x: x.clamp(0.0, max_x),
            y: y.clamp(0.0, max_y),
            w: self.w,
            h: self.h,
        }
    }

    /// Each field clamped to [0, 1]
    pub fn clamped(&self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
            w: clamp_unit(self.w),
            h: clamp_unit(self.h),
        }
    }
}
