/// Formats, detections and decode attempts
pub mod barcode;
/// Encoded images and picked files
pub mod payload;
/// Normalized points and the on-screen image box
pub mod point;
/// Normalized selection rectangles
pub mod rect;

pub use barcode::{
    AcceptedBarcode, AttemptSource, BarcodeFormat, DecodeAttempt, Detection, QualityTier,
};
pub use payload::{ImagePayload, SelectedFile};
pub use point::{NormalizedPoint, ScreenBox};
pub use rect::{MIN_RECT_SIDE, NormalizedRect};
