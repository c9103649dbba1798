//! Normalized pointer positions and the on-screen image box

/// Pointer position as fractions of the displayed image's width/height
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint {
    /// X coordinate in [0, 1]
    pub x: f32,
    /// Y coordinate in [0, 1]
    pub y: f32,
}

impl NormalizedPoint {
    /// Create a point, clamping both coordinates to [0, 1]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Offset from `origin` to this point
    pub fn offset_from(&self, origin: &NormalizedPoint) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// On-screen bounding box of the displayed image, in client pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenBox {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Rendered width
    pub width: f32,
    /// Rendered height
    pub height: f32,
}

impl ScreenBox {
    /// Create a bounding box
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Map a client-space pointer position into normalized image space.
    ///
    /// A box with no area maps everything to the origin.
    pub fn normalize(&self, client_x: f32, client_y: f32) -> NormalizedPoint {
        if self.width <= 0.0 || self.height <= 0.0 {
            return NormalizedPoint::default();
        }
        NormalizedPoint::new(
            (client_x - self.left) / self.width,
            (client_y - self.top) / self.height,
        )
    }
}

/// Clamp to [0, 1]; NaN collapses to 0
pub(crate) fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
