use super::{accept_candidate, region_settings, tier_settings};
use crate::config::ScanConfig;
use crate::engine::{DecodeEngine, DecoderSettings};
use crate::error::{ScanError, ScanResult};
use crate::models::{
    AcceptedBarcode, AttemptSource, DecodeAttempt, Detection, ImagePayload, QualityTier,
    SelectedFile,
};
use crate::roi::{PointerEvent, RoiController};
use crate::utils::crop::crop_to_region;
use log::{debug, info};

/// Shown when neither whole-image tier finds a code
pub const NO_BARCODE_IN_IMAGE: &str =
    "No barcode found. Draw a selection around the barcode and scan it.";
/// Shown when the cropped selection has no code
pub const NO_BARCODE_IN_SELECTION: &str =
    "No barcode found in the selection. Adjust the selection and try again.";

/// Where a gallery scan stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryStage {
    /// Waiting for the host's file picker
    PickingFile,
    /// Image shown, nothing detected yet
    Preview,
    /// A validated code is waiting for the user to apply it
    Detected(Detection),
}

/// Still-image scan: whole-image tiers, then a user-selected region
#[derive(Debug, Clone)]
pub struct GalleryScan {
    stage: GalleryStage,
    image: Option<ImagePayload>,
    roi: RoiController,
    message: Option<String>,
    attempts: Vec<DecodeAttempt>,
    config: ScanConfig,
}

impl GalleryScan {
    /// Fresh scan waiting for a file
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            stage: GalleryStage::PickingFile,
            image: None,
            roi: RoiController::default(),
            message: None,
            attempts: Vec::new(),
            config: config.clone(),
        }
    }

    /// Validate and load a picked file, replacing any previous image.
    ///
    /// No decoding happens here; a rejected file leaves the scan untouched.
    pub fn select_file(&mut self, file: SelectedFile) -> ScanResult<()> {
        let name = file.name.clone();
        let payload = file.into_payload()?;
        info!("loaded {} ({}, {} bytes)", name, payload.mime, payload.bytes.len());
        self.image = Some(payload);
        self.roi.clear();
        self.message = None;
        self.stage = GalleryStage::Preview;
        Ok(())
    }

    /// Decode the whole image at the default tier, then at the high tier
    /// only if the first pass produced nothing valid.
    pub fn decode_whole_image<E: DecodeEngine + ?Sized>(
        &mut self,
        engine: &mut E,
    ) -> ScanResult<Option<Detection>> {
        let image = self.image.as_ref().ok_or(ScanError::NoImage)?;
        for tier in [QualityTier::Default, QualityTier::High] {
            let settings = tier_settings(tier, &self.config);
            let found = run_attempt(
                engine,
                image,
                &settings,
                AttemptSource::WholeImage,
                tier,
                &mut self.attempts,
            );
            if let Some(detection) = found {
                info!("whole image {:?} tier: {}", tier, detection.code);
                self.message = None;
                self.stage = GalleryStage::Detected(detection.clone());
                return Ok(Some(detection));
            }
        }
        debug!("whole image: nothing at either tier");
        self.message = Some(NO_BARCODE_IN_IMAGE.to_string());
        self.stage = GalleryStage::Preview;
        Ok(None)
    }

    /// Crop the finalized selection and decode it once, EAN readers only.
    ///
    /// On failure the selection is cleared so the user can draw a new one.
    pub fn scan_selection<E: DecodeEngine + ?Sized>(
        &mut self,
        engine: &mut E,
    ) -> ScanResult<Option<Detection>> {
        let image = self.image.as_ref().ok_or(ScanError::NoImage)?;
        let rect = self.roi.selection().ok_or(ScanError::NoSelection)?;
        let region = crop_to_region(image, &rect, &self.config.crop);
        let settings = region_settings(&self.config);

        let found = run_attempt(
            engine,
            &region,
            &settings,
            AttemptSource::CroppedRegion,
            QualityTier::High,
            &mut self.attempts,
        );
        match found {
            Some(detection) => {
                info!("selection: {}", detection.code);
                self.message = None;
                self.stage = GalleryStage::Detected(detection.clone());
                Ok(Some(detection))
            }
            None => {
                debug!("selection {:?}: nothing found", rect);
                self.message = Some(NO_BARCODE_IN_SELECTION.to_string());
                self.roi.clear();
                self.stage = GalleryStage::Preview;
                Ok(None)
            }
        }
    }

    /// Forward a pointer event to the selection, when an image is shown
    pub fn pointer(&mut self, event: PointerEvent) {
        if self.image.is_none() {
            debug!("pointer event without an image");
            return;
        }
        self.roi.handle(event);
    }

    /// Drop the selection
    pub fn clear_selection(&mut self) {
        self.roi.clear();
    }

    /// Hand over the detected code
    pub fn apply(&self) -> Option<AcceptedBarcode> {
        match &self.stage {
            GalleryStage::Detected(detection) => {
                Some(AcceptedBarcode::new(detection.code.clone()))
            }
            _ => None,
        }
    }

    /// Current stage
    pub fn stage(&self) -> &GalleryStage {
        &self.stage
    }

    /// Loaded image
    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    /// Detected code, if any
    pub fn detected(&self) -> Option<&Detection> {
        match &self.stage {
            GalleryStage::Detected(detection) => Some(detection),
            _ => None,
        }
    }

    /// Status line for a detected code
    pub fn detected_label(&self) -> Option<String> {
        self.detected().map(|d| format!("Barcode detected: {}", d.code))
    }

    /// Current user-facing message
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Selection controller
    pub fn roi(&self) -> &RoiController {
        &self.roi
    }

    /// Selection controller, for screen-box updates
    pub fn roi_mut(&mut self) -> &mut RoiController {
        &mut self.roi
    }

    /// Every engine call made so far, in order
    pub fn attempts(&self) -> &[DecodeAttempt] {
        &self.attempts
    }
}

fn run_attempt<E: DecodeEngine + ?Sized>(
    engine: &mut E,
    image: &ImagePayload,
    settings: &DecoderSettings,
    source: AttemptSource,
    tier: QualityTier,
    log: &mut Vec<DecodeAttempt>,
) -> Option<Detection> {
    let result = engine.decode_single(image, settings);
    let accepted = result.clone().and_then(accept_candidate);
    log.push(DecodeAttempt {
        source,
        tier,
        result,
        accepted: accepted.is_some(),
    });
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CameraConstraints;
    use crate::error::EngineError;
    use crate::models::{BarcodeFormat, NormalizedPoint};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Answers `decode_single` from a script and records the settings used
    #[derive(Default)]
    struct ScriptedStill {
        answers: VecDeque<Option<Detection>>,
        calls: Vec<DecoderSettings>,
    }

    impl DecodeEngine for ScriptedStill {
        fn start_live(
            &mut self,
            _: &CameraConstraints,
            _: &DecoderSettings,
        ) -> Result<(), EngineError> {
            Err(EngineError::new("NotFoundError"))
        }

        fn stop_live(&mut self) {}

        fn decode_single(
            &mut self,
            _image: &ImagePayload,
            settings: &DecoderSettings,
        ) -> Option<Detection> {
            self.calls.push(settings.clone());
            self.answers.pop_front().flatten()
        }
    }

    fn png_file() -> SelectedFile {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            300,
            200,
            image::Rgb([200, 200, 200]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        SelectedFile::new("shelf.png", "image/png", bytes)
    }

    fn ean(code: &str) -> Option<Detection> {
        Some(Detection::new(code, BarcodeFormat::Ean13))
    }

    fn draw(scan: &mut GalleryScan, from: (f32, f32), to: (f32, f32)) {
        scan.pointer(PointerEvent::Down(NormalizedPoint::new(from.0, from.1)));
        scan.pointer(PointerEvent::Move(NormalizedPoint::new(to.0, to.1)));
        scan.pointer(PointerEvent::Up);
    }

    #[test]
    fn test_rejects_non_image() {
        let mut scan = GalleryScan::new(&ScanConfig::default());
        let err = scan
            .select_file(SelectedFile::new("notes.txt", "text/plain", b"hi".to_vec()))
            .expect_err("not an image");
        assert!(matches!(err, ScanError::InvalidFile { .. }));
        assert_eq!(scan.stage(), &GalleryStage::PickingFile);
        assert!(scan.image().is_none());
    }

    #[test]
    fn test_decode_requires_image() {
        let mut scan = GalleryScan::new(&ScanConfig::default());
        let mut engine = ScriptedStill::default();
        assert!(matches!(
            scan.decode_whole_image(&mut engine),
            Err(ScanError::NoImage)
        ));
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn test_default_tier_hit_skips_high() {
        let mut scan = GalleryScan::new(&ScanConfig::default());
        scan.select_file(png_file()).expect("valid png");
        let mut engine = ScriptedStill::default();
        engine.answers.push_back(ean("4006381333931"));
        let found = scan.decode_whole_image(&mut engine).expect("image loaded");
        assert_eq!(found.map(|d| d.code), Some("4006381333931".to_string()));
        assert_eq!(engine.calls.len(), 1);
        assert_eq!(engine.calls[0].input_size, Some(800));
    }

    #[test]
    fn test_two_tiers_in_order() {
        let mut scan = GalleryScan::new(&ScanConfig::default());
        scan.select_file(png_file()).expect("valid png");
        let mut engine = ScriptedStill::default();
        engine.answers.push_back(None);
        engine.answers.push_back(ean("4006381333931"));

        scan.decode_whole_image(&mut engine).expect("image loaded");
        assert_eq!(engine.calls.len(), 2);
        assert!(engine.calls[0].locator.half_sample);
        assert!(!engine.calls[1].locator.half_sample);
        assert_eq!(
            scan.detected_label().as_deref(),
            Some("Barcode detected: 4006381333931")
        );
        let tiers: Vec<_> = scan.attempts().iter().map(|a| a.tier).collect();
        assert_eq!(tiers, vec![QualityTier::Default, QualityTier::High]);
    }

    #[test]
    fn test_bad_checksum_counts_as_not_found() {
        let mut scan = GalleryScan::new(&ScanConfig::default());
        scan.select_file(png_file()).expect("valid png");
        let mut engine = ScriptedStill::default();
        engine.answers.push_back(ean("4006381333932"));
        engine.answers.push_back(None);

        assert_eq!(scan.decode_whole_image(&mut engine).expect("loaded"), None);
        assert_eq!(engine.calls.len(), 2);
        assert_eq!(scan.message(), Some(NO_BARCODE_IN_IMAGE));
        assert!(scan.attempts()[0].result.is_some());
        assert!(!scan.attempts()[0].accepted);
        assert!(scan.apply().is_none());
    }

    #[test]
    fn test_selection_failure_clears_roi() {
        let mut scan = GalleryScan::new(&ScanConfig::default());
        scan.select_file(png_file()).expect("valid png");
        let mut engine = ScriptedStill::default();
        assert!(matches!(
            scan.scan_selection(&mut engine),
            Err(ScanError::NoSelection)
        ));

        draw(&mut scan, (0.1, 0.3), (0.9, 0.6));
        assert!(scan.roi().selection().is_some());
        assert_eq!(scan.scan_selection(&mut engine).expect("selection"), None);
        assert_eq!(scan.message(), Some(NO_BARCODE_IN_SELECTION));
        assert!(scan.roi().rect().is_none());
        assert_eq!(scan.stage(), &GalleryStage::Preview);
        assert_eq!(engine.calls.len(), 1);
        assert_eq!(engine.calls[0].readers.formats().len(), 2);
    }

    #[test]
    fn test_selection_success_then_apply() {
        let mut scan = GalleryScan::new(&ScanConfig::default());
        scan.select_file(png_file()).expect("valid png");
        draw(&mut scan, (0.1, 0.3), (0.9, 0.6));
        let mut engine = ScriptedStill::default();
        engine.answers.push_back(ean("5901234123457"));
        scan.scan_selection(&mut engine).expect("selection");
        assert_eq!(
            scan.attempts().last().map(|a| a.source),
            Some(AttemptSource::CroppedRegion)
        );
        assert_eq!(
            scan.apply().map(|a| a.into_string()),
            Some("5901234123457".to_string())
        );
    }

    #[test]
    fn test_new_file_resets_selection() {
        let mut scan = GalleryScan::new(&ScanConfig::default());
        scan.select_file(png_file()).expect("valid png");
        draw(&mut scan, (0.1, 0.1), (0.5, 0.5));
        scan.select_file(png_file()).expect("valid png");
        assert!(scan.roi().rect().is_none());
        assert_eq!(scan.stage(), &GalleryStage::Preview);
    }
}
