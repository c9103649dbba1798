//! Image bytes and data URLs

use crate::error::{ScanError, ScanResult};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Encoded image ready to hand to a decode engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// MIME type of `bytes`
    pub mime: String,
    /// Encoded image bytes
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Wrap already-encoded bytes
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Decode to pixels
    pub fn decode(&self) -> ScanResult<DynamicImage> {
        Ok(image::load_from_memory(&self.bytes)?)
    }

    /// `data:` URL form, for hosts that move images around as strings
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    /// Parse a base64 `data:` URL
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (meta, data) = rest.split_once(',')?;
        let mime = meta.strip_suffix(";base64")?;
        let bytes = BASE64.decode(data).ok()?;
        Some(Self::new(mime, bytes))
    }
}

/// A file handed over by the host's file picker
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Display name
    pub name: String,
    /// MIME type as reported by the picker
    pub mime: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Create a selected file
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Check the file is a readable image and turn it into a payload.
    ///
    /// Only the header is parsed here; full decoding happens in the engine.
    pub fn into_payload(self) -> ScanResult<ImagePayload> {
        if !self.mime.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(ScanError::InvalidFile {
                name: self.name,
                mime: self.mime,
            });
        }
        let (width, height) = ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()?
            .into_dimensions()?;
        log::debug!("selected {} ({}x{}, {})", self.name, width, height, self.mime);
        Ok(ImagePayload::new(self.mime, self.bytes))
    }
}
