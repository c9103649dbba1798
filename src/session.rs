//! Top-level scanner session
//!
//! The host feeds [`ScanEvent`]s one at a time into
//! [`ScannerSession::handle`]. The session owns the decode engine and the
//! active camera or gallery scan, and reports back through [`ScanHost`]:
//! exactly one of `on_barcode_accepted` or `on_cancelled`, after which the
//! session is [`ViewMode::Closed`] and ignores everything.

use crate::config::{self, ScanConfig};
use crate::engine::DecodeEngine;
use crate::models::{AcceptedBarcode, Detection, SelectedFile};
use crate::orchestrator::{CameraScan, CameraStatus, GalleryScan, GalleryStage};
use crate::roi::PointerEvent;
use log::{debug, info, warn};

/// Which screen the scanner is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Choosing between camera and gallery
    #[default]
    Select,
    /// Live camera scan
    Camera,
    /// Still-image scan
    Gallery,
    /// Finished; nothing more is delivered
    Closed,
}

/// Input to the session
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Use the camera
    ChooseCamera,
    /// Pick an image from the gallery
    ChooseGallery,
    /// The file picker returned a file
    FileSelected(SelectedFile),
    /// The file picker was closed without a file
    FilePickerDismissed,
    /// Pointer input over the displayed image
    Pointer(PointerEvent),
    /// Decode the drawn selection
    ScanSelection,
    /// Drop the drawn selection
    ClearSelection,
    /// Confirm the detected gallery code
    Apply,
    /// Retry a failed camera start
    Retry,
    /// Close the scanner
    Cancel,
    /// The live engine read a code
    Detected(Detection),
}

impl ViewMode {
    /// View after `event`, for user-driven navigation.
    ///
    /// Acceptance also closes the session, but only the session knows when a
    /// read was accepted, so that transition is not covered here.
    pub fn next(self, event: &ScanEvent) -> ViewMode {
        match (self, event) {
            (ViewMode::Closed, _) => ViewMode::Closed,
            (_, ScanEvent::Cancel) => ViewMode::Closed,
            (ViewMode::Select, ScanEvent::ChooseCamera) => ViewMode::Camera,
            (ViewMode::Select, ScanEvent::ChooseGallery) => ViewMode::Gallery,
            (ViewMode::Gallery, ScanEvent::FilePickerDismissed) => ViewMode::Select,
            (view, _) => view,
        }
    }
}

/// Severity of a [`Notice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Something worked
    Success,
    /// Something failed
    Error,
}

/// Short message for the host to surface, e.g. as a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub kind: NoticeKind,
    /// Heading
    pub title: String,
    /// Detail line
    pub body: String,
}

impl Notice {
    /// Success notice
    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Error notice
    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// The application embedding the scanner
pub trait ScanHost {
    /// A validated code; the session is closed afterwards
    fn on_barcode_accepted(&mut self, barcode: AcceptedBarcode);

    /// The user closed the scanner
    fn on_cancelled(&mut self);

    /// Transient user feedback
    fn notify(&mut self, _notice: Notice) {}
}

/// One run of the scanner, from the mode choice to accept or cancel
pub struct ScannerSession<E: DecodeEngine, H: ScanHost> {
    engine: E,
    host: H,
    config: ScanConfig,
    view: ViewMode,
    camera: Option<CameraScan>,
    gallery: Option<GalleryScan>,
}

impl<E: DecodeEngine, H: ScanHost> ScannerSession<E, H> {
    /// Session using the process-wide configuration
    pub fn new(engine: E, host: H) -> Self {
        Self::with_config(engine, host, config::global().clone())
    }

    /// Session with an explicit configuration
    pub fn with_config(engine: E, host: H, config: ScanConfig) -> Self {
        Self {
            engine,
            host,
            config,
            view: ViewMode::Select,
            camera: None,
            gallery: None,
        }
    }

    /// Process one event and return the resulting view
    pub fn handle(&mut self, event: ScanEvent) -> ViewMode {
        if self.view == ViewMode::Closed {
            debug!("session closed, dropping {:?}", event);
            return self.view;
        }
        if matches!(event, ScanEvent::FilePickerDismissed) && !self.is_picking_file() {
            debug!("picker dismissed outside file selection");
            return self.view;
        }

        let next = self.view.next(&event);
        match (self.view, event) {
            (_, ScanEvent::Cancel) => self.cancel(),
            (ViewMode::Select, ScanEvent::ChooseCamera) => {
                self.view = next;
                self.open_camera();
            }
            (ViewMode::Select, ScanEvent::ChooseGallery) => {
                self.view = next;
                self.gallery = Some(GalleryScan::new(&self.config));
            }
            (ViewMode::Gallery, ScanEvent::FilePickerDismissed) => {
                self.gallery = None;
                self.view = next;
            }
            (ViewMode::Gallery, ScanEvent::FileSelected(file)) => self.load_file(file),
            (ViewMode::Gallery, ScanEvent::Pointer(pointer)) => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.pointer(pointer);
                }
            }
            (ViewMode::Gallery, ScanEvent::ClearSelection) => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.clear_selection();
                }
            }
            (ViewMode::Gallery, ScanEvent::ScanSelection) => self.scan_selection(),
            (ViewMode::Gallery, ScanEvent::Apply) => {
                if let Some(accepted) = self.gallery.as_ref().and_then(GalleryScan::apply) {
                    self.deliver(accepted);
                }
            }
            (ViewMode::Camera, ScanEvent::Retry) => self.retry_camera(),
            (ViewMode::Camera, ScanEvent::Detected(detection)) => {
                let accepted = match self.camera.as_mut() {
                    Some(camera) => camera.on_detected(detection, &mut self.engine),
                    None => None,
                };
                if let Some(accepted) = accepted {
                    self.deliver(accepted);
                }
            }
            (view, event) => debug!("ignoring {:?} in {:?}", event, view),
        }
        self.view
    }

    fn is_picking_file(&self) -> bool {
        self.view == ViewMode::Gallery
            && self
                .gallery
                .as_ref()
                .is_some_and(|g| *g.stage() == GalleryStage::PickingFile)
    }

    fn open_camera(&mut self) {
        let mut camera = CameraScan::new(&self.config);
        camera.start(&mut self.engine);
        self.report_camera_failure(&camera);
        self.camera = Some(camera);
    }

    fn retry_camera(&mut self) {
        let Some(mut camera) = self.camera.take() else {
            return;
        };
        if camera.retry(&mut self.engine) {
            self.report_camera_failure(&camera);
        }
        self.camera = Some(camera);
    }

    fn report_camera_failure(&mut self, camera: &CameraScan) {
        if let CameraStatus::Failed(failure) = camera.status() {
            self.host
                .notify(Notice::error("Camera Error", failure.message.clone()));
        }
    }

    fn load_file(&mut self, file: SelectedFile) {
        let Some(gallery) = self.gallery.as_mut() else {
            return;
        };
        if let Err(err) = gallery.select_file(file) {
            warn!("rejected file: {}", err);
            self.host.notify(Notice::error("Invalid file", err.to_string()));
            return;
        }
        if let Err(err) = gallery.decode_whole_image(&mut self.engine) {
            warn!("whole-image decode skipped: {}", err);
        }
    }

    fn scan_selection(&mut self) {
        let Some(gallery) = self.gallery.as_mut() else {
            return;
        };
        if let Err(err) = gallery.scan_selection(&mut self.engine) {
            debug!("selection scan skipped: {}", err);
        }
    }

    fn deliver(&mut self, accepted: AcceptedBarcode) {
        self.teardown();
        info!("delivering {}", accepted);
        self.host.notify(Notice::success(
            "Barcode Scanned",
            format!("Detected barcode: {}", accepted),
        ));
        self.host.on_barcode_accepted(accepted);
        self.view = ViewMode::Closed;
    }

    fn cancel(&mut self) {
        self.teardown();
        info!("scanner cancelled");
        self.host.on_cancelled();
        self.view = ViewMode::Closed;
    }

    fn teardown(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            camera.stop(&mut self.engine);
        }
        self.gallery = None;
    }

    /// Current view
    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Active camera scan
    pub fn camera(&self) -> Option<&CameraScan> {
        self.camera.as_ref()
    }

    /// Active gallery scan
    pub fn gallery(&self) -> Option<&GalleryScan> {
        self.gallery.as_ref()
    }

    /// Mutable gallery scan, for layout updates on its selection
    pub fn gallery_mut(&mut self) -> Option<&mut GalleryScan> {
        self.gallery.as_mut()
    }

    /// Configuration in use
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The decode engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The decode engine, mutably
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Take the engine and host back
    pub fn into_parts(self) -> (E, H) {
        (self.engine, self.host)
    }
}
