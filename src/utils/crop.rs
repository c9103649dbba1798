//! ROI crop-and-upscale
//!
//! Turns the user's normalized selection into a fresh, enlarged JPEG so the
//! engine sees the symbol at a useful module width.

use crate::error::ScanResult;
use crate::models::{ImagePayload, NormalizedRect};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use log::{debug, warn};

/// Crop/upscale policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSettings {
    /// Crops narrower or shorter than this are not worth decoding
    pub min_crop_px: u32,
    /// Output width the upscale aims for
    pub target_width: u32,
    /// Upscale cap
    pub max_scale: f32,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            min_crop_px: 10,
            target_width: 900,
            max_scale: 4.0,
            jpeg_quality: 92,
        }
    }
}

/// A rectangle in source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

/// Resolve a normalized rect against an image size, staying inside the image
pub fn resolve_region(rect: &NormalizedRect, width: u32, height: u32) -> PixelRegion {
    let r = rect.clamped();
    let x = ((r.x * width as f32).round() as u32).min(width);
    let y = ((r.y * height as f32).round() as u32).min(height);
    PixelRegion {
        x,
        y,
        width: ((r.w * width as f32).round() as u32).min(width - x),
        height: ((r.h * height as f32).round() as u32).min(height - y),
    }
}

/// Scale that brings `crop_width` up to the target, between 1x and the cap
pub fn upscale_factor(crop_width: u32, settings: &CropSettings) -> f32 {
    if crop_width == 0 {
        return 1.0;
    }
    let cap = settings.max_scale.max(1.0);
    (settings.target_width as f32 / crop_width as f32).clamp(1.0, cap)
}

/// Crop `rect` out of `img` and upscale it. `None` when the crop is too small.
pub fn crop_and_upscale(
    img: &DynamicImage,
    rect: &NormalizedRect,
    settings: &CropSettings,
) -> Option<DynamicImage> {
    let region = resolve_region(rect, img.width(), img.height());
    if region.width < settings.min_crop_px || region.height < settings.min_crop_px {
        debug!(
            "crop {}x{} below {}px minimum",
            region.width, region.height, settings.min_crop_px
        );
        return None;
    }

    let scale = upscale_factor(region.width, settings);
    let cropped = img.crop_imm(region.x, region.y, region.width, region.height);
    if scale <= 1.0 {
        return Some(cropped);
    }
    let out_w = ((region.width as f32 * scale).round() as u32).max(1);
    let out_h = ((region.height as f32 * scale).round() as u32).max(1);
    debug!(
        "upscaling crop {}x{} by {:.2} to {}x{}",
        region.width, region.height, scale, out_w, out_h
    );
    Some(cropped.resize_exact(out_w, out_h, FilterType::CatmullRom))
}

/// Encode pixels as JPEG
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> ScanResult<Vec<u8>> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
    Ok(out)
}

/// Crop and upscale the selection of an encoded image.
///
/// Any failure (undecodable input, crop too small, encoder error) hands back
/// the input unchanged so the pipeline can carry on with the whole image.
pub fn crop_to_region(
    image: &ImagePayload,
    rect: &NormalizedRect,
    settings: &CropSettings,
) -> ImagePayload {
    let decoded = match image.decode() {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!("cannot decode image for cropping: {}", err);
            return image.clone();
        }
    };
    let Some(region) = crop_and_upscale(&decoded, rect, settings) else {
        return image.clone();
    };
    match encode_jpeg(&region, settings.jpeg_quality) {
        Ok(bytes) => ImagePayload::new("image/jpeg", bytes),
        Err(err) => {
            warn!("cannot encode cropped region: {}", err);
            image.clone()
        }
    }
}
