//! Scanner tuning, with environment overrides
//!
//! Every knob has a compiled default. `PANTRY_SCAN_*` variables override
//! them; values that fail to parse are ignored.

use crate::utils::crop::CropSettings;
use std::sync::OnceLock;

/// Consecutive identical camera reads required before acceptance
pub const DEFAULT_STABLE_DETECTIONS: u32 = 1;
/// Camera initialisation retries offered to the user
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Longest side fed to the engine on the default tier
pub const DEFAULT_TIER_INPUT_SIZE: u32 = 800;
/// Longest side fed to the engine on the high tier
pub const HIGH_TIER_INPUT_SIZE: u32 = 1600;

/// Session-wide scanner settings
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Stability gate threshold for the live camera path
    pub stable_detections: u32,
    /// Retry ceiling for camera initialisation
    pub max_retries: u32,
    /// Default tier input size in pixels
    pub default_input_size: u32,
    /// High tier input size in pixels
    pub high_input_size: u32,
    /// ROI crop/upscale policy
    pub crop: CropSettings,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            stable_detections: DEFAULT_STABLE_DETECTIONS,
            max_retries: DEFAULT_MAX_RETRIES,
            default_input_size: DEFAULT_TIER_INPUT_SIZE,
            high_input_size: HIGH_TIER_INPUT_SIZE,
            crop: CropSettings::default(),
        }
    }
}

fn parse_u32(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u32) -> u32 {
    lookup(name)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

impl ScanConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = Self::default();
        let crop = CropSettings {
            target_width: parse_u32(
                &lookup,
                "PANTRY_SCAN_CROP_TARGET_WIDTH",
                base.crop.target_width,
            )
            .max(1),
            ..base.crop
        };
        Self {
            stable_detections: parse_u32(
                &lookup,
                "PANTRY_SCAN_STABLE_DETECTIONS",
                base.stable_detections,
            )
            .max(1),
            max_retries: parse_u32(&lookup, "PANTRY_SCAN_MAX_RETRIES", base.max_retries),
            default_input_size: parse_u32(
                &lookup,
                "PANTRY_SCAN_DEFAULT_SIZE",
                base.default_input_size,
            )
            .max(1),
            high_input_size: parse_u32(&lookup, "PANTRY_SCAN_HIGH_SIZE", base.high_input_size)
                .max(1),
            crop,
        }
    }

    /// Builder-style override of the stability threshold
    pub fn with_stable_detections(mut self, n: u32) -> Self {
        self.stable_detections = n.max(1);
        self
    }
}

static GLOBAL: OnceLock<ScanConfig> = OnceLock::new();

/// Process-wide snapshot of [`ScanConfig::from_env`], read once
pub fn global() -> &'static ScanConfig {
    GLOBAL.get_or_init(ScanConfig::from_env)
}
