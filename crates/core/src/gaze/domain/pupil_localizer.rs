use crate::shared::frame::Frame;

use super::eye_region::EyeRegion;

/// Pupil centre relative to its eye box; both axes in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PupilEstimate {
    pub x: f64,
    pub y: f64,
}

impl PupilEstimate {
    /// Reported whenever no pupil can be measured.
    pub const CENTER: PupilEstimate = PupilEstimate { x: 0.5, y: 0.5 };

    /// Clamps both axes into `[0, 1]`; non-finite input yields the centre.
    pub fn clamped(x: f64, y: f64) -> Self {
        if !x.is_finite() || !y.is_finite() {
            return Self::CENTER;
        }
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// Domain interface for locating the pupil inside one eye region.
///
/// Never fails: anything that prevents a measurement yields
/// [`PupilEstimate::CENTER`].
pub trait PupilLocalizer: Send + Sync {
    fn locate(&self, frame: &Frame, region: &EyeRegion) -> PupilEstimate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-0.2, 0.3, 0.0, 0.3)]
    #[case(1.5, 0.7, 1.0, 0.7)]
    #[case(0.25, 2.0, 0.25, 1.0)]
    fn test_clamped(#[case] x: f64, #[case] y: f64, #[case] ex: f64, #[case] ey: f64) {
        assert_eq!(PupilEstimate::clamped(x, y), PupilEstimate { x: ex, y: ey });
    }

    #[test]
    fn test_non_finite_is_center() {
        assert_eq!(PupilEstimate::clamped(f64::NAN, 0.2), PupilEstimate::CENTER);
        assert_eq!(PupilEstimate::clamped(0.2, f64::INFINITY), PupilEstimate::CENTER);
    }
}
