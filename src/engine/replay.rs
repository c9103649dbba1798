use super::linescan::LineScanEngine;
use super::{CameraConstraints, DecodeEngine, DecoderSettings};
use crate::error::EngineError;
use crate::models::{Detection, ImagePayload};
use log::{debug, info};

/// Outcome of pulling one frame from a replayed stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramePoll {
    /// The frame contained a readable symbol
    Detected(Detection),
    /// The frame had nothing readable
    Empty,
    /// The stream is stopped or out of frames
    Finished,
}

/// Still frames played back as a camera stream, read by [`LineScanEngine`]
#[derive(Debug, Clone, Default)]
pub struct FrameReplay {
    frames: Vec<ImagePayload>,
    cursor: usize,
    live: Option<DecoderSettings>,
    reader: LineScanEngine,
}

impl FrameReplay {
    /// Replay `frames` in order
    pub fn new(frames: Vec<ImagePayload>) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }

    /// Whether the stream is running
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Decode the next frame of a running stream
    pub fn poll_frame(&mut self) -> FramePoll {
        let Some(settings) = self.live.as_ref() else {
            return FramePoll::Finished;
        };
        let Some(frame) = self.frames.get(self.cursor) else {
            return FramePoll::Finished;
        };
        self.cursor += 1;
        match self.reader.decode_single(frame, settings) {
            Some(found) => {
                debug!("frame {}: {} ({})", self.cursor, found.code, found.format);
                FramePoll::Detected(found)
            }
            None => FramePoll::Empty,
        }
    }
}

impl DecodeEngine for FrameReplay {
    fn start_live(
        &mut self,
        _constraints: &CameraConstraints,
        settings: &DecoderSettings,
    ) -> Result<(), EngineError> {
        if self.frames.is_empty() {
            return Err(EngineError::new("NotFoundError: no frames to replay"));
        }
        info!("replaying {} frames", self.frames.len());
        self.cursor = 0;
        self.live = Some(settings.clone());
        Ok(())
    }

    fn stop_live(&mut self) {
        self.live = None;
    }

    fn decode_single(
        &mut self,
        image: &ImagePayload,
        settings: &DecoderSettings,
    ) -> Option<Detection> {
        self.reader.decode_single(image, settings)
    }
}
