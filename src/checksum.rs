//! EAN/UPC check-digit arithmetic
//!
//! EAN-13, EAN-8, UPC-A and UPC-E share one mod-10 scheme: digits left of
//! the check digit are weighted 3, 1, 3, ... starting from the digit right
//! next to it.

use crate::models::BarcodeFormat;

/// Check a numeric EAN-13 / UPC-A / EAN-8 payload against its check digit.
///
/// Only all-digit strings of length 8, 12 or 13 can be valid.
pub fn is_valid_checksum(code: &str) -> bool {
    if !matches!(code.len(), 8 | 12 | 13) || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (body, check) = code.split_at(code.len() - 1);
    let check = check.as_bytes()[0] - b'0';
    check_digit(body) == Some(check)
}

/// Expected check digit for `body` (a digit string without its check digit).
pub fn check_digit(body: &str) -> Option<u8> {
    if body.is_empty() {
        return None;
    }
    let mut sum = 0u32;
    for (pos, b) in body.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return None;
        }
        let weight = if pos % 2 == 0 { 3 } else { 1 };
        sum += (b - b'0') as u32 * weight;
    }
    Some(((10 - sum % 10) % 10) as u8)
}

/// Expand an 8-digit UPC-E code to its 12-digit UPC-A form.
///
/// Returns `None` for anything that is not number system 0/1 followed by
/// seven digits.
pub fn expand_upce(code: &str) -> Option<String> {
    let d = code.as_bytes();
    if d.len() != 8 || !d.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if d[0] != b'0' && d[0] != b'1' {
        return None;
    }
    let m = &d[1..7];
    let (manufacturer, product): ([u8; 5], [u8; 5]) = match m[5] {
        b'0'..=b'2' => (
            [m[0], m[1], m[5], b'0', b'0'],
            [b'0', b'0', m[2], m[3], m[4]],
        ),
        b'3' => (
            [m[0], m[1], m[2], b'0', b'0'],
            [b'0', b'0', b'0', m[3], m[4]],
        ),
        b'4' => (
            [m[0], m[1], m[2], m[3], b'0'],
            [b'0', b'0', b'0', b'0', m[4]],
        ),
        _ => (
            [m[0], m[1], m[2], m[3], m[4]],
            [b'0', b'0', b'0', b'0', m[5]],
        ),
    };

    let mut out = String::with_capacity(12);
    out.push(d[0] as char);
    out.extend(manufacturer.iter().map(|&b| b as char));
    out.extend(product.iter().map(|&b| b as char));
    out.push(d[7] as char);
    Some(out)
}

/// Validate `code` the way its reported format requires.
///
/// Formats outside the EAN/UPC family carry no mod-10 check digit and always
/// pass.
pub fn validate_for_format(code: &str, format: BarcodeFormat) -> bool {
    if !format.carries_checksum() {
        return true;
    }
    match format {
        BarcodeFormat::UpcE => expand_upce(code).is_some_and(|upca| is_valid_checksum(&upca)),
        _ => is_valid_checksum(code),
    }
}
