//! Scanline EAN/UPC reader
//!
//! Pipeline per image:
//! 1. Bound the input size, optionally half-sample, convert to luma.
//! 2. Average horizontal bands (height from the locator patch size) into
//!    1D profiles, centre band first.
//! 3. Threshold each profile (global midpoint, then a moving mean) and turn
//!    it into bar/space run lengths.
//! 4. Match EAN-13 (95 modules, 59 runs) and EAN-8 (67 modules, 43 runs)
//!    layouts at every bar, forwards and backwards. No quiet zone is
//!    required, so tight crops still read.
//! 5. If no horizontal band reads, retry on the image rotated 90 degrees.
//!
//! Only reads whose check digit balances are reported.

use super::{CameraConstraints, DecodeEngine, DecoderSettings, ReaderSet};
use crate::checksum::is_valid_checksum;
use crate::error::EngineError;
use crate::models::{BarcodeFormat, Detection, ImagePayload};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use log::{debug, trace};
use rayon::prelude::*;

/// L-code widths (space, bar, space, bar); R-code uses the same widths starting with a bar
const L_PATTERNS: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

/// G-code widths: L reversed
const G_PATTERNS: [[u8; 4]; 10] = [
    [1, 1, 2, 3],
    [1, 2, 2, 2],
    [2, 2, 1, 2],
    [1, 1, 4, 1],
    [2, 3, 1, 1],
    [1, 3, 2, 1],
    [4, 1, 1, 1],
    [2, 1, 3, 1],
    [3, 1, 2, 1],
    [2, 1, 1, 3],
];

/// Left-half parity for each leading EAN-13 digit
const FIRST_DIGIT_PARITY: [&[u8; 6]; 10] = [
    b"LLLLLL", b"LLGLGG", b"LLGGLG", b"LLGGGL", b"LGLLGG", b"LGGLLG", b"LGGGLL", b"LGLGLG",
    b"LGLGGL", b"LGGLGL",
];

const EAN13_RUNS: usize = 59;
const EAN13_MODULES: f32 = 95.0;
const EAN8_RUNS: usize = 43;
const EAN8_MODULES: f32 = 67.0;

/// Accepted guard run width, in modules
const GUARD_TOLERANCE: (f32, f32) = (0.4, 1.8);
/// Largest summed width error (in modules) for a digit match
const MAX_DIGIT_ERROR: f32 = 1.8;

/// Narrowest input worth scanning: one module per pixel for EAN-8
const MIN_SCAN_WIDTH: u32 = 67;

/// Built-in still-image decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct LineScanEngine;

impl LineScanEngine {
    /// Create an engine
    pub fn new() -> Self {
        Self
    }

    /// Decode already-decoded pixels
    pub fn decode_image(
        &self,
        img: &DynamicImage,
        settings: &DecoderSettings,
    ) -> Option<Detection> {
        let gray = prepare(img, settings);
        let band = settings.locator.patch_size.band_height();
        trace!(
            "line scan {}x{} band={} readers={:?}",
            gray.width(),
            gray.height(),
            band,
            settings.readers.formats()
        );
        scan_gray(&gray, band, &settings.readers)
            .or_else(|| scan_gray(&imageops::rotate90(&gray), band, &settings.readers))
    }
}

impl DecodeEngine for LineScanEngine {
    fn start_live(
        &mut self,
        _constraints: &CameraConstraints,
        _settings: &DecoderSettings,
    ) -> Result<(), EngineError> {
        Err(EngineError::new(
            "NotFoundError: the line-scan engine has no camera device",
        ))
    }

    fn stop_live(&mut self) {}

    fn decode_single(
        &mut self,
        image: &ImagePayload,
        settings: &DecoderSettings,
    ) -> Option<Detection> {
        match image.decode() {
            Ok(img) => self.decode_image(&img, settings),
            Err(err) => {
                debug!("line scan cannot decode payload: {}", err);
                None
            }
        }
    }
}

fn prepare(img: &DynamicImage, settings: &DecoderSettings) -> GrayImage {
    let mut work = match settings.input_size {
        Some(max) if img.width().max(img.height()) > max => {
            img.resize(max, max, FilterType::Triangle)
        }
        _ => img.clone(),
    };
    if settings.locator.half_sample && work.width() >= 2 * MIN_SCAN_WIDTH && work.height() >= 2 {
        work = work.resize_exact(work.width() / 2, work.height() / 2, FilterType::Triangle);
    }
    work.to_luma8()
}

/// Scan horizontal bands of `gray`, centre outwards
pub fn scan_gray(gray: &GrayImage, band: u32, readers: &ReaderSet) -> Option<Detection> {
    let (width, height) = gray.dimensions();
    if width < MIN_SCAN_WIDTH || height == 0 {
        return None;
    }
    let band = band.clamp(1, height);
    let centre = height as i64 / 2;
    let mut starts: Vec<u32> = (0..height).step_by(band as usize).collect();
    starts.sort_by_key(|&y| (y as i64 + band as i64 / 2 - centre).abs());

    starts.par_iter().find_map_first(|&y0| {
        let profile = band_profile(gray, y0, band);
        decode_profile(&profile, readers)
    })
}

/// Column means of rows `y0..y0+band`
pub fn band_profile(gray: &GrayImage, y0: u32, band: u32) -> Vec<u8> {
    let (width, height) = gray.dimensions();
    let y1 = (y0 + band).min(height);
    let rows = (y1 - y0).max(1);
    (0..width)
        .map(|x| {
            let sum: u32 = (y0..y1).map(|y| gray.get_pixel(x, y)[0] as u32).sum();
            (sum / rows) as u8
        })
        .collect()
}

/// Decode one 1D intensity profile
pub fn decode_profile(profile: &[u8], readers: &ReaderSet) -> Option<Detection> {
    if let Some(global) = binarize_global(profile) {
        if let Some(found) = decode_runs_both_ways(&runs(&global), readers) {
            return Some(found);
        }
    }
    let adaptive = runs(&binarize_adaptive(profile));
    decode_runs_both_ways(&adaptive, readers)
}

/// Threshold halfway between the darkest and lightest sample. `None` for flat profiles.
fn binarize_global(profile: &[u8]) -> Option<Vec<bool>> {
    let min = *profile.iter().min()?;
    let max = *profile.iter().max()?;
    if max - min < 32 {
        return None;
    }
    let threshold = ((min as u16 + max as u16) / 2) as u8;
    Some(profile.iter().map(|&v| v < threshold).collect())
}

/// Moving-mean threshold for uneven lighting; true = dark
fn binarize_adaptive(profile: &[u8]) -> Vec<bool> {
    let n = profile.len();
    let win = (n / 32).clamp(8, 64);
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0u32);
    for &v in profile {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v as u32);
    }
    (0..n)
        .map(|i| {
            let left = i.saturating_sub(win);
            let right = (i + win).min(n - 1);
            let mean = (prefix[right + 1] - prefix[left]) / (right - left + 1) as u32;
            (profile[i] as i32) < mean as i32 - 5
        })
        .collect()
}

/// Run lengths as `(is_bar, width)`
fn runs(bits: &[bool]) -> Vec<(bool, u32)> {
    let mut out: Vec<(bool, u32)> = Vec::new();
    for &b in bits {
        match out.last_mut() {
            Some((dark, len)) if *dark == b => *len += 1,
            _ => out.push((b, 1)),
        }
    }
    out
}

fn decode_runs_both_ways(runs: &[(bool, u32)], readers: &ReaderSet) -> Option<Detection> {
    decode_runs(runs, readers).or_else(|| {
        let reversed: Vec<(bool, u32)> = runs.iter().rev().copied().collect();
        decode_runs(&reversed, readers)
    })
}

fn decode_runs(runs: &[(bool, u32)], readers: &ReaderSet) -> Option<Detection> {
    let want_13 = readers.contains(BarcodeFormat::Ean13) || readers.contains(BarcodeFormat::UpcA);
    let want_8 = readers.contains(BarcodeFormat::Ean8);
    let widths: Vec<f32> = runs.iter().map(|&(_, w)| w as f32).collect();

    for (i, &(dark, _)) in runs.iter().enumerate() {
        // Symbols start on a bar; the quiet zone may be cropped away.
        if !dark {
            continue;
        }
        if want_13 {
            if let Some(found) =
                read_ean13(&widths[i..]).and_then(|code| classify_13(code, readers))
            {
                return Some(found);
            }
        }
        if want_8 {
            if let Some(code) = read_ean8(&widths[i..]) {
                return Some(Detection::new(code, BarcodeFormat::Ean8));
            }
        }
    }
    None
}

fn classify_13(code: String, readers: &ReaderSet) -> Option<Detection> {
    if readers.contains(BarcodeFormat::Ean13) {
        return Some(Detection::new(code, BarcodeFormat::Ean13));
    }
    // UPC-A is EAN-13 with a leading zero.
    code.strip_prefix('0')
        .map(|upc| Detection::new(upc, BarcodeFormat::UpcA))
}

fn is_guard(widths: &[f32], module: f32) -> bool {
    widths.iter().all(|&w| {
        let m = w / module;
        m >= GUARD_TOLERANCE.0 && m <= GUARD_TOLERANCE.1
    })
}

/// Best match of four run widths against a code table: `(digit, error)`
fn match_digit(widths: &[f32], table: &[[u8; 4]; 10]) -> (u8, f32) {
    let total: f32 = widths.iter().sum();
    let scale = if total > 0.0 { 7.0 / total } else { 0.0 };
    let mut best = (0u8, f32::INFINITY);
    for (digit, pattern) in table.iter().enumerate() {
        let error: f32 = widths
            .iter()
            .zip(pattern.iter())
            .map(|(&w, &p)| (w * scale - p as f32).abs())
            .sum();
        if error < best.1 {
            best = (digit as u8, error);
        }
    }
    best
}

fn read_digit(widths: &[f32], table: &[[u8; 4]; 10]) -> Option<u8> {
    let (digit, error) = match_digit(widths, table);
    (error <= MAX_DIGIT_ERROR).then_some(digit)
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|&d| (b'0' + d) as char).collect()
}

fn read_ean13(widths: &[f32]) -> Option<String> {
    if widths.len() < EAN13_RUNS {
        return None;
    }
    let w = &widths[..EAN13_RUNS];
    let module = w.iter().sum::<f32>() / EAN13_MODULES;
    if !is_guard(&w[0..3], module) || !is_guard(&w[27..32], module) || !is_guard(&w[56..59], module)
    {
        return None;
    }

    let mut digits = [0u8; 13];
    let mut parity = [b'L'; 6];
    for d in 0..6 {
        let chunk = &w[3 + 4 * d..7 + 4 * d];
        let (l_digit, l_err) = match_digit(chunk, &L_PATTERNS);
        let (g_digit, g_err) = match_digit(chunk, &G_PATTERNS);
        let (digit, err, code) = if l_err <= g_err {
            (l_digit, l_err, b'L')
        } else {
            (g_digit, g_err, b'G')
        };
        if err > MAX_DIGIT_ERROR {
            return None;
        }
        digits[1 + d] = digit;
        parity[d] = code;
    }
    for d in 0..6 {
        digits[7 + d] = read_digit(&w[32 + 4 * d..36 + 4 * d], &L_PATTERNS)?;
    }
    digits[0] = FIRST_DIGIT_PARITY.iter().position(|p| **p == parity)? as u8;

    let code = digits_to_string(&digits);
    is_valid_checksum(&code).then_some(code)
}

fn read_ean8(widths: &[f32]) -> Option<String> {
    if widths.len() < EAN8_RUNS {
        return None;
    }
    let w = &widths[..EAN8_RUNS];
    let module = w.iter().sum::<f32>() / EAN8_MODULES;
    if !is_guard(&w[0..3], module) || !is_guard(&w[19..24], module) || !is_guard(&w[40..43], module)
    {
        return None;
    }

    let mut digits = [0u8; 8];
    for d in 0..4 {
        digits[d] = read_digit(&w[3 + 4 * d..7 + 4 * d], &L_PATTERNS)?;
        digits[4 + d] = read_digit(&w[24 + 4 * d..28 + 4 * d], &L_PATTERNS)?;
    }
    let code = digits_to_string(&digits);
    is_valid_checksum(&code).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LocatorConfig;

    /// Module widths for an EAN-13 symbol, quiet zones included
    fn ean13_modules(code: &str) -> Vec<u8> {
        let d: Vec<usize> = code.bytes().map(|b| (b - b'0') as usize).collect();
        let parity = FIRST_DIGIT_PARITY[d[0]];
        let mut m = vec![10, 1, 1, 1];
        for i in 0..6 {
            let table = if parity[i] == b'G' { &G_PATTERNS } else { &L_PATTERNS };
            m.extend_from_slice(&table[d[1 + i]]);
        }
        m.extend_from_slice(&[1, 1, 1, 1, 1]);
        for i in 0..6 {
            m.extend_from_slice(&L_PATTERNS[d[7 + i]]);
        }
        m.extend_from_slice(&[1, 1, 1, 10]);
        m
    }

    fn ean8_modules(code: &str) -> Vec<u8> {
        let d: Vec<usize> = code.bytes().map(|b| (b - b'0') as usize).collect();
        let mut m = vec![10, 1, 1, 1];
        for i in 0..4 {
            m.extend_from_slice(&L_PATTERNS[d[i]]);
        }
        m.extend_from_slice(&[1, 1, 1, 1, 1]);
        for i in 4..8 {
            m.extend_from_slice(&L_PATTERNS[d[i]]);
        }
        m.extend_from_slice(&[1, 1, 1, 10]);
        m
    }

    /// Profile starting with (light) quiet zone
    fn profile(modules: &[u8], unit: usize) -> Vec<u8> {
        shade(modules, unit, 235, 20)
    }

    /// Alternate `first` and `second` over the module runs
    fn shade(modules: &[u8], unit: usize, first: u8, second: u8) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, &m) in modules.iter().enumerate() {
            let value = if i % 2 == 0 { first } else { second };
            out.extend(std::iter::repeat_n(value, m as usize * unit));
        }
        out
    }

    fn image_of(row: &[u8], height: u32) -> DynamicImage {
        let width = row.len() as u32;
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, _| {
            image::Luma([row[x as usize]])
        }))
    }

    fn settings(
        readers: ReaderSet,
        locator: LocatorConfig,
        input_size: Option<u32>,
    ) -> DecoderSettings {
        DecoderSettings {
            readers,
            locator,
            input_size,
        }
    }

    #[test]
    fn test_profile_ean13() {
        let p = profile(&ean13_modules("5901234123457"), 3);
        let found = decode_profile(&p, &ReaderSet::retail()).expect("decoded");
        assert_eq!(found, Detection::new("5901234123457", BarcodeFormat::Ean13));
    }

    #[test]
    fn test_profile_starts_on_guard_bar() {
        let modules = ean13_modules("5901234123457");
        let tight_left = shade(&modules[1..], 3, 20, 235);
        let found = decode_profile(&tight_left, &ReaderSet::retail()).expect("decoded");
        assert_eq!(found, Detection::new("5901234123457", BarcodeFormat::Ean13));

        let tight_both = shade(&modules[1..modules.len() - 1], 3, 20, 235);
        let found = decode_profile(&tight_both, &ReaderSet::retail()).expect("decoded");
        assert_eq!(found.code, "5901234123457");
    }

    #[test]
    fn test_profile_low_contrast() {
        let p = shade(&ean13_modules("5901234123457"), 3, 150, 125);
        let found = decode_profile(&p, &ReaderSet::retail()).expect("decoded");
        assert_eq!(found, Detection::new("5901234123457", BarcodeFormat::Ean13));
    }

    #[test]
    fn test_profile_ean8() {
        let p = profile(&ean8_modules("96385074"), 3);
        let found = decode_profile(&p, &ReaderSet::ean_only()).expect("decoded");
        assert_eq!(found, Detection::new("96385074", BarcodeFormat::Ean8));
    }

    #[test]
    fn test_profile_upca_only_reader() {
        let p = profile(&ean13_modules("0036000291452"), 2);
        let readers = ReaderSet::new([BarcodeFormat::UpcA]);
        let found = decode_profile(&p, &readers).expect("decoded");
        assert_eq!(found, Detection::new("036000291452", BarcodeFormat::UpcA));
    }

    #[test]
    fn test_profile_upside_down() {
        let mut p = profile(&ean13_modules("4006381333931"), 3);
        p.reverse();
        let found = decode_profile(&p, &ReaderSet::retail()).expect("decoded");
        assert_eq!(found.code, "4006381333931");
    }

    #[test]
    fn test_reader_set_is_respected() {
        let p = profile(&ean8_modules("96385074"), 3);
        let readers = ReaderSet::new([BarcodeFormat::Ean13]);
        assert!(decode_profile(&p, &readers).is_none());
    }

    #[test]
    fn test_flat_profile() {
        assert!(decode_profile(&[128u8; 400], &ReaderSet::retail()).is_none());
    }

    #[test]
    fn test_whole_image_default_and_high() {
        let row = profile(&ean13_modules("5901234123457"), 4);
        let img = image_of(&row, 60);
        let engine = LineScanEngine::new();
        let default = settings(ReaderSet::retail(), LocatorConfig::moderate(), Some(800));
        let high = settings(ReaderSet::retail(), LocatorConfig::thorough(), Some(1600));
        assert_eq!(
            engine.decode_image(&img, &default).map(|d| d.code),
            Some("5901234123457".to_string())
        );
        assert_eq!(
            engine.decode_image(&img, &high).map(|d| d.code),
            Some("5901234123457".to_string())
        );
    }

    #[test]
    fn test_vertical_symbol() {
        let row = profile(&ean13_modules("5901234123457"), 3);
        let img = image_of(&row, 40);
        let rotated = DynamicImage::ImageLuma8(imageops::rotate270(&img.to_luma8()));
        let engine = LineScanEngine::new();
        let high = settings(ReaderSet::retail(), LocatorConfig::thorough(), None);
        let found = engine.decode_image(&rotated, &high).expect("decoded");
        assert_eq!(found.code, "5901234123457");
    }

    #[test]
    fn test_no_camera() {
        let mut engine = LineScanEngine::new();
        let s = settings(ReaderSet::retail(), LocatorConfig::moderate(), None);
        let err = engine
            .start_live(&CameraConstraints::default(), &s)
            .expect_err("no camera");
        assert!(err.message.contains("NotFoundError"));
    }
}
