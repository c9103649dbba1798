//! Decode orchestration
//!
//! Sequences decode-engine calls for both acquisition modes and decides
//! which reads become candidates:
//! - camera: one live stream, reads gated by checksum and [`StabilityGate`]
//! - gallery: whole image at default then high tier, then an optional
//!   cropped-region pass; the user confirms before anything is accepted

/// Live camera scan
pub mod camera;
/// Still-image scan
pub mod gallery;
/// Consecutive-read confirmation
pub mod stability;

pub use camera::{CameraFailure, CameraFailureKind, CameraScan, CameraStatus};
pub use gallery::{GalleryScan, GalleryStage};
pub use stability::StabilityGate;

use crate::checksum::validate_for_format;
use crate::config::ScanConfig;
use crate::engine::{DecoderSettings, LocatorConfig, ReaderSet};
use crate::models::{Detection, QualityTier};

/// Pass a read through checksum gating. Failing reads are dropped as noise.
pub fn accept_candidate(detection: Detection) -> Option<Detection> {
    if validate_for_format(&detection.code, detection.format) {
        Some(detection)
    } else {
        log::debug!(
            "dropping {} read {:?}: check digit mismatch",
            detection.format,
            detection.code
        );
        None
    }
}

/// Live camera configuration
pub fn camera_settings() -> DecoderSettings {
    DecoderSettings {
        readers: ReaderSet::retail(),
        locator: LocatorConfig::moderate(),
        input_size: None,
    }
}

/// Whole-image configuration for a quality tier
pub fn tier_settings(tier: QualityTier, config: &ScanConfig) -> DecoderSettings {
    match tier {
        QualityTier::Default => DecoderSettings {
            readers: ReaderSet::retail(),
            locator: LocatorConfig::moderate(),
            input_size: Some(config.default_input_size),
        },
        QualityTier::High => DecoderSettings {
            readers: ReaderSet::retail(),
            locator: LocatorConfig::thorough(),
            input_size: Some(config.high_input_size),
        },
    }
}

/// Cropped-region configuration: high quality, EAN readers only
pub fn region_settings(config: &ScanConfig) -> DecoderSettings {
    DecoderSettings {
        readers: ReaderSet::ean_only(),
        locator: LocatorConfig::thorough(),
        input_size: Some(config.high_input_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PatchSize;
    use crate::models::BarcodeFormat;

    #[test]
    fn test_accept_candidate() {
        let good = Detection::new("5901234123457", BarcodeFormat::Ean13);
        assert_eq!(accept_candidate(good.clone()), Some(good));
        assert_eq!(
            accept_candidate(Detection::new("5901234123450", BarcodeFormat::Ean13)),
            None
        );
        let free_text = Detection::new("HELLO-128", BarcodeFormat::Code128);
        assert_eq!(accept_candidate(free_text.clone()), Some(free_text));
    }

    #[test]
    fn test_tiers_differ() {
        let cfg = ScanConfig::default();
        let default = tier_settings(QualityTier::Default, &cfg);
        let high = tier_settings(QualityTier::High, &cfg);
        assert_eq!(default.input_size, Some(800));
        assert_eq!(default.locator.patch_size, PatchSize::Medium);
        assert!(default.locator.half_sample);
        assert_eq!(high.input_size, Some(1600));
        assert_eq!(high.locator.patch_size, PatchSize::Large);
        assert!(!high.locator.half_sample);
    }

    #[test]
    fn test_region_readers_are_ean_only() {
        let region = region_settings(&ScanConfig::default());
        assert_eq!(
            region.readers.formats(),
            &[BarcodeFormat::Ean13, BarcodeFormat::Ean8]
        );
        assert!(!region.locator.half_sample);
    }
}
