//! Image helpers
//!
//! - Crop and upscale of a normalized selection for a focused decode pass

pub mod crop;
