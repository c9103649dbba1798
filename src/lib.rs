//! pantry_scan - barcode scanning core for a pantry inventory app
//!
//! Acquires retail barcodes from a live camera or a still image, lets the
//! user draw a region of interest when the whole image fails, and only hands
//! over codes whose check digit validates.
//!
//! The decode engine sits behind [`engine::DecodeEngine`]; the crate ships a
//! line-scan EAN/UPC reader ([`engine::linescan::LineScanEngine`]) and a
//! frame replayer that stands in for a camera.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Check-digit validation for EAN/UPC codes
pub mod checksum;
/// Thresholds and tier sizes, with environment overrides
pub mod config;
/// Decode engine interface and built-in engines
pub mod engine;
/// Error types
pub mod error;
/// Core data structures (formats, detections, geometry, payloads)
pub mod models;
/// Camera and gallery decode orchestration
pub mod orchestrator;
/// Region-of-interest drawing and moving
pub mod roi;
/// Top-level scanner session and host interface
pub mod session;
/// File loading helpers for the CLI
pub mod tools;
/// Image helpers (crop and upscale)
pub mod utils;

pub use checksum::{is_valid_checksum, validate_for_format};
pub use config::ScanConfig;
pub use engine::{DecodeEngine, DecoderSettings};
pub use error::{EngineError, ScanError, ScanResult};
pub use models::{
    AcceptedBarcode, BarcodeFormat, Detection, ImagePayload, NormalizedRect, SelectedFile,
};
pub use session::{Notice, ScanEvent, ScanHost, ScannerSession, ViewMode};
