//! Barcode formats and decode results

use std::fmt;

/// 1D symbologies the scanner can be configured to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    /// EAN-13 (also carries UPC-A with a leading zero)
    Ean13,
    /// EAN-8
    Ean8,
    /// UPC-A, 12 digits
    UpcA,
    /// UPC-E, zero-suppressed 8 digits
    UpcE,
    /// Code 128
    Code128,
    /// Code 39
    Code39,
}

impl BarcodeFormat {
    /// Every format, in reader priority order
    pub const ALL: [BarcodeFormat; 6] = [
        BarcodeFormat::Ean13,
        BarcodeFormat::Ean8,
        BarcodeFormat::Code128,
        BarcodeFormat::Code39,
        BarcodeFormat::UpcA,
        BarcodeFormat::UpcE,
    ];

    /// Format name as decode engines report it
    pub fn name(&self) -> &'static str {
        match self {
            BarcodeFormat::Ean13 => "ean_13",
            BarcodeFormat::Ean8 => "ean_8",
            BarcodeFormat::UpcA => "upc_a",
            BarcodeFormat::UpcE => "upc_e",
            BarcodeFormat::Code128 => "code_128",
            BarcodeFormat::Code39 => "code_39",
        }
    }

    /// Parse an engine-reported format name
    pub fn from_name(name: &str) -> Option<Self> {
        BarcodeFormat::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Whether the format carries the EAN/UPC mod-10 check digit
    pub fn carries_checksum(&self) -> bool {
        matches!(
            self,
            BarcodeFormat::Ean13 | BarcodeFormat::Ean8 | BarcodeFormat::UpcA | BarcodeFormat::UpcE
        )
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw read reported by a decode engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Decoded payload
    pub code: String,
    /// Reported symbology
    pub format: BarcodeFormat,
}

impl Detection {
    /// Create a detection
    pub fn new(code: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            code: code.into(),
            format,
        }
    }
}

/// Where the pixels of a decode attempt came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptSource {
    /// The whole gallery image
    WholeImage,
    /// The user's cropped and upscaled selection
    CroppedRegion,
}

/// Decode quality level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    /// Bounded input, medium locator patches, half-sampling
    Default,
    /// Larger input, large locator patches, full resolution
    High,
}

/// One call into the decode engine and what came back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeAttempt {
    /// Pixel source
    pub source: AttemptSource,
    /// Quality tier used
    pub tier: QualityTier,
    /// Engine output, before checksum gating
    pub result: Option<Detection>,
    /// Whether the result survived checksum gating
    pub accepted: bool,
}

/// Validated payload handed to the host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedBarcode(String);

impl AcceptedBarcode {
    pub(crate) fn new(code: String) -> Self {
        Self(code)
    }

    /// Borrow the payload
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the payload
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AcceptedBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
