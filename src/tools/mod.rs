//! Filesystem helpers for the `scantool` binary

use crate::error::{ScanError, ScanResult};
use crate::models::{ImagePayload, NormalizedRect, SelectedFile};
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Read a file the way a picker would hand it over: name, MIME and bytes.
///
/// The MIME type comes from the extension; unknown extensions are reported
/// as `application/octet-stream` and rejected later by the gallery flow.
pub fn load_selected_file<P: AsRef<Path>>(path: P) -> ScanResult<SelectedFile> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let mime = ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SelectedFile::new(name, mime, bytes))
}

/// Load every image in `dir`, sorted by file name, as replay frames.
pub fn load_frames<P: AsRef<Path>>(dir: P) -> ScanResult<Vec<ImagePayload>> {
    let mut paths = image_paths(dir.as_ref())?;
    paths.sort();

    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        match load_selected_file(&path)?.into_payload() {
            Ok(payload) => frames.push(payload),
            Err(err) => log::warn!("skipping frame {}: {}", path.display(), err),
        }
    }
    Ok(frames)
}

fn image_paths(dir: &Path) -> ScanResult<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                images.push(path);
            }
        }
    }
    Ok(images)
}

/// Parse `x,y,w,h` in normalized coordinates.
pub fn parse_rect(text: &str) -> ScanResult<NormalizedRect> {
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ScanError::InvalidRect(format!("{text}: {err}")))?;

    let [x, y, w, h] = values[..] else {
        return Err(ScanError::InvalidRect(format!(
            "{text}: expected four values, got {}",
            values.len()
        )));
    };
    let in_unit = |v: f32| (0.0..=1.0).contains(&v);
    if !(in_unit(x) && in_unit(y) && in_unit(w) && in_unit(h)) || w == 0.0 || h == 0.0 {
        return Err(ScanError::InvalidRect(format!(
            "{text}: values must lie in [0, 1] with a non-zero size"
        )));
    }
    Ok(NormalizedRect::new(x, y, w, h).clamped())
}
