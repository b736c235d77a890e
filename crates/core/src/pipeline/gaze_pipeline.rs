use chrono::{DateTime, Utc};

use crate::detection::domain::face_locator::FaceLocator;
use crate::detection::domain::face_region::FaceRegion;
use crate::detection::domain::landmark_extractor::{BackendKind, LandmarkExtractor};
use crate::detection::infrastructure::backend_factory::create_backend;
use crate::gaze::domain::blink_gate::BlinkGate;
use crate::gaze::domain::eye_region::EyeRegion;
use crate::gaze::domain::gaze_classifier::GazeClassifier;
use crate::gaze::domain::gaze_result::GazeResult;
use crate::gaze::domain::pupil_localizer::{PupilEstimate, PupilLocalizer};
use crate::gaze::infrastructure::contour_pupil_localizer::ContourPupilLocalizer;
use crate::shared::config::GazeConfig;
use crate::shared::error::GazeError;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;

use super::debug_sink::{DebugAnnotations, DebugSink};

/// Single-frame gaze analysis: face → landmarks → blink gate → pupils →
/// direction.
///
/// Built once, then shared by reference; `analyze` takes `&self` so any
/// number of threads can use one pipeline behind an `Arc`. Every frame
/// produces exactly one [`GazeResult`]; nothing escapes as an error.
pub struct GazePipeline {
    face_locator: Box<dyn FaceLocator>,
    landmarks: Box<dyn LandmarkExtractor>,
    pupils: Box<dyn PupilLocalizer>,
    blink_gate: BlinkGate,
    classifier: GazeClassifier,
    backend: BackendKind,
    debug_sink: Option<Box<dyn DebugSink>>,
}

impl GazePipeline {
    /// Assembles a pipeline from explicit face and landmark stages.
    /// Fails only when `config` does not validate.
    pub fn new(
        face_locator: Box<dyn FaceLocator>,
        landmarks: Box<dyn LandmarkExtractor>,
        backend: BackendKind,
        config: &GazeConfig,
    ) -> Result<Self, GazeError> {
        config.validate()?;
        Ok(Self {
            face_locator,
            landmarks,
            pupils: Box::new(ContourPupilLocalizer::from_config(config)),
            blink_gate: BlinkGate::new(config.closed_ear_threshold),
            classifier: GazeClassifier::new(config.direction_thresholds),
            backend,
            debug_sink: None,
        })
    }

    /// Validates `config` and builds the best available backend for it.
    pub fn from_config(config: &GazeConfig) -> Result<Self, GazeError> {
        let backend = create_backend(config)?;
        Self::new(
            backend.face_locator,
            backend.landmarks,
            backend.kind,
            config,
        )
    }

    pub fn with_debug_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    pub fn with_pupil_localizer(mut self, pupils: Box<dyn PupilLocalizer>) -> Self {
        self.pupils = pupils;
        self
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Decodes `bytes` and analyzes the frame. Undecodable input yields an
    /// `error` result.
    pub fn analyze_bytes(&self, bytes: &[u8], index: usize, timestamp: DateTime<Utc>) -> GazeResult {
        match Frame::decode(bytes, index) {
            Ok(frame) => self.analyze(&frame, timestamp),
            Err(e) => {
                log::debug!("Frame {index}: {e}");
                GazeResult::error(e.to_string(), timestamp)
            }
        }
    }

    pub fn analyze(&self, frame: &Frame, timestamp: DateTime<Utc>) -> GazeResult {
        if frame.is_empty() {
            log::debug!("Frame {}: no pixels", frame.index());
            return GazeResult::error("frame has no pixels", timestamp);
        }
        let face = match self.face_locator.locate(frame) {
            Ok(Some(face)) => face,
            Ok(None) => {
                log::debug!("Frame {}: no face", frame.index());
                return GazeResult::no_face(timestamp);
            }
            Err(e) => {
                log::debug!("Frame {}: face stage failed: {e}", frame.index());
                return GazeResult::error(e.to_string(), timestamp);
            }
        };

        let mut notes = DebugAnnotations::new(face);
        let result = self.analyze_face(frame, &face, &mut notes, timestamp);
        log::debug!(
            "Frame {}: {} (ear {:.3}/{:.3})",
            frame.index(),
            result.status(),
            result.ear_left(),
            result.ear_right()
        );

        notes.status = result.status();
        notes.direction = result.direction();
        self.emit_debug(frame, &notes);
        result
    }

    fn analyze_face(
        &self,
        frame: &Frame,
        face: &FaceRegion,
        notes: &mut DebugAnnotations,
        timestamp: DateTime<Utc>,
    ) -> GazeResult {
        let landmarks = match self.landmarks.extract(frame, face) {
            Ok(landmarks) => landmarks,
            Err(e) => return GazeResult::error(e.to_string(), timestamp),
        };
        notes.landmarks = Some(landmarks);

        let blink = self.blink_gate.evaluate(&landmarks);
        if blink.closed {
            return GazeResult::closed(blink.ear_left, blink.ear_right, timestamp);
        }

        let left_eye = EyeRegion::from_ring(&landmarks.left);
        let right_eye = EyeRegion::from_ring(&landmarks.right);
        let left = self.pupils.locate(frame, &left_eye);
        let right = self.pupils.locate(frame, &right_eye);
        notes.pupils = Some([to_frame(&left_eye, left), to_frame(&right_eye, right)]);

        let (direction, confidence) = self.classifier.classify(left, right);
        GazeResult::ok(
            direction,
            confidence,
            blink.ear_left,
            blink.ear_right,
            timestamp,
        )
    }

    fn emit_debug(&self, frame: &Frame, notes: &DebugAnnotations) {
        if let Some(sink) = &self.debug_sink {
            if let Err(e) = sink.emit(frame, notes) {
                log::warn!("Debug output for frame {} failed: {e}", frame.index());
            }
        }
    }
}

fn to_frame(eye: &EyeRegion, pupil: PupilEstimate) -> Point {
    Point::new(
        eye.bbox.x + pupil.x * eye.bbox.width,
        eye.bbox.y + pupil.y * eye.bbox.height,
    )
}
