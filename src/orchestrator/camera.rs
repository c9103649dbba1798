use super::stability::StabilityGate;
use super::{accept_candidate, camera_settings};
use crate::config::ScanConfig;
use crate::engine::{CameraConstraints, DecodeEngine, DecoderSettings};
use crate::models::{AcceptedBarcode, Detection};
use log::{debug, info, warn};

/// Why the camera could not be started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFailureKind {
    /// The user or platform refused camera access
    PermissionDenied,
    /// No matching camera device
    CameraNotFound,
    /// Anything else
    Generic,
}

impl CameraFailureKind {
    /// Classify a platform error message
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("permission denied") || lower.contains("notallowederror") {
            CameraFailureKind::PermissionDenied
        } else if lower.contains("notfounderror") || lower.contains("not found") {
            CameraFailureKind::CameraNotFound
        } else {
            CameraFailureKind::Generic
        }
    }

    /// User-facing text; `attempt` is 1-based
    pub fn user_message(&self, attempt: u32, max_retries: u32) -> String {
        match self {
            CameraFailureKind::PermissionDenied => {
                "Camera access denied. Please grant camera permissions and try again.".to_string()
            }
            CameraFailureKind::CameraNotFound => {
                "No camera found. Please check your camera connection.".to_string()
            }
            CameraFailureKind::Generic => format!(
                "Failed to access camera ({}/{}). Please try again.",
                attempt, max_retries
            ),
        }
    }
}

/// A classified camera start failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFailure {
    /// Failure class
    pub kind: CameraFailureKind,
    /// Text to show the user
    pub message: String,
    /// Raw engine message
    pub cause: String,
}

/// Where the live scan stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraStatus {
    /// Not started
    Idle,
    /// Waiting on the engine
    Initializing,
    /// Frames are being read
    Streaming,
    /// Start failed
    Failed(CameraFailure),
    /// A code passed every gate; the stream is stopped
    Accepted(String),
    /// Stream stopped without a result
    Stopped,
}

/// Live camera scan: stream lifecycle, retry ceiling and acceptance gating
#[derive(Debug, Clone)]
pub struct CameraScan {
    status: CameraStatus,
    retry_count: u32,
    max_retries: u32,
    gate: StabilityGate,
    constraints: CameraConstraints,
    settings: DecoderSettings,
}

impl CameraScan {
    /// Scan using thresholds from `config`
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            status: CameraStatus::Idle,
            retry_count: 0,
            max_retries: config.max_retries,
            gate: StabilityGate::new(config.stable_detections),
            constraints: CameraConstraints::default(),
            settings: camera_settings(),
        }
    }

    /// Override the stream constraints
    pub fn with_constraints(mut self, constraints: CameraConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// (Re)start the stream. Any previous stream is stopped first.
    pub fn start<E: DecodeEngine + ?Sized>(&mut self, engine: &mut E) -> &CameraStatus {
        engine.stop_live();
        self.gate.reset();
        self.status = CameraStatus::Initializing;

        match engine.start_live(&self.constraints, &self.settings) {
            Ok(()) => {
                info!("camera stream started");
                self.retry_count = 0;
                self.status = CameraStatus::Streaming;
            }
            Err(err) => {
                let kind = CameraFailureKind::classify(&err.message);
                let attempt = (self.retry_count + 1).min(self.max_retries.max(1));
                let message = kind.user_message(attempt, self.max_retries);
                warn!("camera start failed ({:?}): {}", kind, err);
                self.status = CameraStatus::Failed(CameraFailure {
                    kind,
                    message,
                    cause: err.message,
                });
            }
        }
        &self.status
    }

    /// Whether the user may retry a failed start
    pub fn can_retry(&self) -> bool {
        matches!(self.status, CameraStatus::Failed(_)) && self.retry_count < self.max_retries
    }

    /// Retry a failed start. False when retrying is not allowed.
    pub fn retry<E: DecodeEngine + ?Sized>(&mut self, engine: &mut E) -> bool {
        if !self.can_retry() {
            debug!(
                "retry refused ({}/{} used)",
                self.retry_count, self.max_retries
            );
            return false;
        }
        self.retry_count += 1;
        self.start(engine);
        true
    }

    /// Label for the retry button, when one should be shown
    pub fn retry_label(&self) -> Option<String> {
        self.can_retry().then(|| {
            format!(
                "Try Again ({}/{})",
                self.retry_count + 1,
                self.max_retries
            )
        })
    }

    /// Handle one detection message from the engine.
    ///
    /// Reads arriving when the stream is not running are ignored, as are
    /// reads failing their check digit.
    pub fn on_detected<E: DecodeEngine + ?Sized>(
        &mut self,
        detection: Detection,
        engine: &mut E,
    ) -> Option<AcceptedBarcode> {
        if self.status != CameraStatus::Streaming {
            debug!("ignoring detection {:?} while {:?}", detection.code, self.status);
            return None;
        }
        let candidate = accept_candidate(detection)?;
        if !self.gate.observe(&candidate.code) {
            debug!(
                "{} seen {:?}, waiting for {}",
                candidate.code,
                self.gate.candidate().map(|(_, n)| n),
                self.gate.threshold()
            );
            return None;
        }

        engine.stop_live();
        info!("accepted {} ({})", candidate.code, candidate.format);
        self.status = CameraStatus::Accepted(candidate.code.clone());
        Some(AcceptedBarcode::new(candidate.code))
    }

    /// Stop the stream and release the camera
    pub fn stop<E: DecodeEngine + ?Sized>(&mut self, engine: &mut E) {
        engine.stop_live();
        self.gate.reset();
        if !matches!(self.status, CameraStatus::Accepted(_)) {
            self.status = CameraStatus::Stopped;
        }
    }

    /// Current status
    pub fn status(&self) -> &CameraStatus {
        &self.status
    }

    /// Retries used since the last successful start
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Retry ceiling
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Stability gate state
    pub fn gate(&self) -> &StabilityGate {
        &self.gate
    }
}
