//! Decode engine boundary
//!
//! The scanning core never reads bars itself. It configures and sequences
//! calls into a [`DecodeEngine`]:
//! - `start_live` / `stop_live` manage a camera stream whose reads come back
//!   as [`crate::session::ScanEvent::Detected`] messages
//! - `decode_single` reads one still image
//!
//! [`linescan::LineScanEngine`] is a built-in EAN/UPC implementation and
//! [`replay::FrameReplay`] replays still frames as a live stream.

/// Built-in EAN-13 / UPC-A / EAN-8 scanline decoder
pub mod linescan;
/// Still frames replayed as a live stream
pub mod replay;

use crate::error::EngineError;
use crate::models::{BarcodeFormat, Detection, ImagePayload};

/// Symbologies an engine should try
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSet(Vec<BarcodeFormat>);

impl ReaderSet {
    /// Reader set from explicit formats
    pub fn new(formats: impl IntoIterator<Item = BarcodeFormat>) -> Self {
        let mut out: Vec<BarcodeFormat> = Vec::new();
        for f in formats {
            if !out.contains(&f) {
                out.push(f);
            }
        }
        Self(out)
    }

    /// Everything the product scanner reads: EAN, UPC, Code 128, Code 39
    pub fn retail() -> Self {
        Self::new([
            BarcodeFormat::Ean13,
            BarcodeFormat::Ean8,
            BarcodeFormat::Code128,
            BarcodeFormat::Code39,
            BarcodeFormat::UpcA,
            BarcodeFormat::UpcE,
        ])
    }

    /// EAN-13 and EAN-8 only, for user-isolated regions
    pub fn ean_only() -> Self {
        Self::new([BarcodeFormat::Ean13, BarcodeFormat::Ean8])
    }

    /// Whether `format` is enabled
    pub fn contains(&self, format: BarcodeFormat) -> bool {
        self.0.contains(&format)
    }

    /// Enabled formats in priority order
    pub fn formats(&self) -> &[BarcodeFormat] {
        &self.0
    }
}

/// Locator patch size, relative to the input image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchSize {
    /// Very small patches
    XSmall,
    /// Small patches
    Small,
    /// Medium patches
    Medium,
    /// Large patches
    Large,
    /// Very large patches
    XLarge,
}

impl PatchSize {
    /// Height in pixels of the band averaged into one scanline
    pub fn band_height(&self) -> u32 {
        match self {
            PatchSize::XSmall => 1,
            PatchSize::Small => 2,
            PatchSize::Medium => 4,
            PatchSize::Large => 6,
            PatchSize::XLarge => 10,
        }
    }
}

/// How the engine searches the image for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Patch size
    pub patch_size: PatchSize,
    /// Work on a half-resolution copy
    pub half_sample: bool,
}

impl LocatorConfig {
    /// Medium patches, half-sampled
    pub fn moderate() -> Self {
        Self {
            patch_size: PatchSize::Medium,
            half_sample: true,
        }
    }

    /// Large patches, full resolution
    pub fn thorough() -> Self {
        Self {
            patch_size: PatchSize::Large,
            half_sample: false,
        }
    }
}

/// Everything passed to the engine for one decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderSettings {
    /// Enabled readers
    pub readers: ReaderSet,
    /// Locator configuration
    pub locator: LocatorConfig,
    /// Longest side the input is bounded to before decoding
    pub input_size: Option<u32>,
}

/// Preferred camera orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Back camera
    Environment,
    /// Front camera
    User,
}

/// Stream requirements passed to `start_live`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConstraints {
    /// Camera to prefer
    pub facing: FacingMode,
    /// Minimum frame width
    pub min_width: u32,
    /// Minimum frame height
    pub min_height: u32,
    /// Allowed width/height ratio range
    pub aspect_ratio: (f32, f32),
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            min_width: 640,
            min_height: 480,
            aspect_ratio: (1.0, 2.0),
        }
    }
}

/// A barcode decoding capability
pub trait DecodeEngine {
    /// Open a live stream and begin reporting detections.
    ///
    /// Detections are delivered by the host as `ScanEvent::Detected`.
    fn start_live(
        &mut self,
        constraints: &CameraConstraints,
        settings: &DecoderSettings,
    ) -> Result<(), EngineError>;

    /// Stop the live stream and release the camera. Must be idempotent.
    fn stop_live(&mut self);

    /// Read a symbol from one still image
    fn decode_single(&mut self, image: &ImagePayload, settings: &DecoderSettings)
    -> Option<Detection>;
}

impl<E: DecodeEngine + ?Sized> DecodeEngine for Box<E> {
    fn start_live(
        &mut self,
        constraints: &CameraConstraints,
        settings: &DecoderSettings,
    ) -> Result<(), EngineError> {
        (**self).start_live(constraints, settings)
    }

    fn stop_live(&mut self) {
        (**self).stop_live()
    }

    fn decode_single(
        &mut self,
        image: &ImagePayload,
        settings: &DecoderSettings,
    ) -> Option<Detection> {
        (**self).decode_single(image, settings)
    }
}
