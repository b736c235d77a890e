use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::gaze::domain::gaze_classifier::GazeDirection;
use crate::gaze::domain::gaze_result::GazeStatus;
use crate::pipeline::debug_sink::{DebugAnnotations, DebugSink};
use crate::shared::error::GazeError;
use crate::shared::frame::Frame;

const FACE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const RING_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const PUPIL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const MARKER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Height of the status bar drawn along the top edge.
const BAR_HEIGHT: u32 = 12;

/// Writes `gaze_<index>.png` annotated copies of analyzed frames.
pub struct ImageDebugSink {
    dir: PathBuf,
}

impl ImageDebugSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("gaze_{index}.png"))
    }
}

impl DebugSink for ImageDebugSink {
    fn emit(&self, frame: &Frame, annotations: &DebugAnnotations) -> Result<(), GazeError> {
        std::fs::create_dir_all(&self.dir)?;
        let img = annotate(frame, annotations);
        let path = self.path_for(frame.index());
        img.save(&path)
            .map_err(|e| GazeError::Io(std::io::Error::other(format!("{}: {e}", path.display()))))?;
        log::trace!("Wrote debug frame {}", path.display());
        Ok(())
    }
}

/// Draws face box, eye rings, pupils and a status bar onto a copy of the
/// frame.
pub fn annotate(frame: &Frame, notes: &DebugAnnotations) -> RgbImage {
    let mut img = frame.to_rgb_image();

    let face = notes.face;
    draw_hollow_rect_mut(
        &mut img,
        Rect::at(face.x(), face.y()).of_size(face.width() as u32, face.height() as u32),
        FACE_COLOR,
    );

    if let Some(landmarks) = &notes.landmarks {
        for p in landmarks.points() {
            draw_filled_circle_mut(&mut img, (p.x.round() as i32, p.y.round() as i32), 1, RING_COLOR);
        }
    }

    if let Some(pupils) = &notes.pupils {
        for p in pupils {
            draw_filled_circle_mut(&mut img, (p.x.round() as i32, p.y.round() as i32), 2, PUPIL_COLOR);
        }
    }

    draw_status_bar(&mut img, notes.status, notes.direction);
    img
}

fn status_color(status: GazeStatus) -> Rgb<u8> {
    match status {
        GazeStatus::Ok => Rgb([40, 160, 40]),
        GazeStatus::Closed => Rgb([220, 180, 0]),
        GazeStatus::NoFace => Rgb([128, 128, 128]),
        GazeStatus::Error => Rgb([200, 30, 30]),
    }
}

/// Colour-coded bar; a white marker shows where the subject is looking.
fn draw_status_bar(img: &mut RgbImage, status: GazeStatus, direction: Option<GazeDirection>) {
    let (w, h) = img.dimensions();
    let bar_h = BAR_HEIGHT.min(h);
    if w == 0 || bar_h == 0 {
        return;
    }
    draw_filled_rect_mut(img, Rect::at(0, 0).of_size(w, bar_h), status_color(status));

    let Some(direction) = direction else {
        return;
    };
    let m = (bar_h / 2).max(1);
    let (mx, my, mw, mh) = match direction {
        GazeDirection::Left => (0, 0, m, bar_h),
        GazeDirection::Right => (w.saturating_sub(m), 0, m, bar_h),
        GazeDirection::Center => ((w / 2).saturating_sub(m / 2), 0, m, bar_h),
        GazeDirection::Up => ((w / 2).saturating_sub(m), 0, 2 * m, (bar_h / 3).max(1)),
        GazeDirection::Down => (
            (w / 2).saturating_sub(m),
            bar_h - (bar_h / 3).max(1),
            2 * m,
            (bar_h / 3).max(1),
        ),
    };
    draw_filled_rect_mut(
        img,
        Rect::at(mx as i32, my as i32).of_size(mw.min(w).max(1), mh),
        MARKER_COLOR,
    );
}
