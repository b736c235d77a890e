/// Pupil localizer based on dark-blob segmentation.
///
/// Thresholds the eye box, keeps only pixels inside the eye polygon,
/// cleans the mask with an opening and a closing, and reports the centroid
/// of the largest outer contour.
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::morphology::{dilate, erode};
use imageproc::point::Point as PixelPoint;

use crate::gaze::domain::eye_region::EyeRegion;
use crate::gaze::domain::pupil_localizer::{PupilEstimate, PupilLocalizer};
use crate::shared::config::GazeConfig;
use crate::shared::frame::Frame;

pub struct ContourPupilLocalizer {
    threshold: u8,
    /// Total structuring radius per morphological pass: repeating an
    /// `LInf` erosion of radius `r` n times equals one of radius `n * r`.
    reach: u8,
}

impl ContourPupilLocalizer {
    pub fn new(threshold: u8, kernel_radius: u8, iterations: u32) -> Self {
        let reach = (kernel_radius as u32).saturating_mul(iterations).min(u8::MAX as u32) as u8;
        Self { threshold, reach }
    }

    pub fn from_config(config: &GazeConfig) -> Self {
        Self::new(
            config.pupil_threshold,
            config.morph_kernel_radius,
            config.morph_iterations,
        )
    }

    fn segment(&self, gray: &GrayImage, mask: &GrayImage) -> GrayImage {
        let mut binary = threshold(gray, self.threshold, ThresholdType::BinaryInverted);
        for (px, m) in binary.pixels_mut().zip(mask.pixels()) {
            if m.0[0] == 0 {
                px.0[0] = 0;
            }
        }
        if self.reach == 0 {
            return binary;
        }
        let opened = dilate(&erode(&binary, Norm::LInf, self.reach), Norm::LInf, self.reach);
        erode(&dilate(&opened, Norm::LInf, self.reach), Norm::LInf, self.reach)
    }
}

impl PupilLocalizer for ContourPupilLocalizer {
    fn locate(&self, frame: &Frame, region: &EyeRegion) -> PupilEstimate {
        let bbox = region.bbox;
        if bbox.is_degenerate() {
            return PupilEstimate::CENTER;
        }

        let x0 = bbox.x.floor().max(0.0) as u32;
        let y0 = bbox.y.floor().max(0.0) as u32;
        let x1 = ((bbox.x + bbox.width).ceil().max(0.0) as u32).min(frame.width());
        let y1 = ((bbox.y + bbox.height).ceil().max(0.0) as u32).min(frame.height());
        if x1 <= x0 || y1 <= y0 {
            return PupilEstimate::CENTER;
        }

        let gray = frame.gray_region(x0, y0, x1 - x0, y1 - y0);
        let Some(mask) = polygon_mask(region, x0, y0, gray.width(), gray.height()) else {
            return PupilEstimate::CENTER;
        };
        let segmented = self.segment(&gray, &mask);

        let contours = find_contours::<i32>(&segmented);
        // first contour wins ties
        let largest = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(moments)
            .fold(None::<Moments>, |best, cur| match best {
                Some(b) if b.m00 >= cur.m00 => Some(b),
                _ => Some(cur),
            });

        let Some(m) = largest else {
            return PupilEstimate::CENTER;
        };
        if m.m00 == 0.0 {
            return PupilEstimate::CENTER;
        }

        let cx = x0 as f64 + m.m10 / m.m00;
        let cy = y0 as f64 + m.m01 / m.m00;
        PupilEstimate::clamped((cx - bbox.x) / bbox.width, (cy - bbox.y) / bbox.height)
    }
}

/// Filled eye polygon in ROI coordinates, or `None` when fewer than three
/// distinct vertices remain after rounding.
fn polygon_mask(region: &EyeRegion, x0: u32, y0: u32, width: u32, height: u32) -> Option<GrayImage> {
    let mut vertices: Vec<PixelPoint<i32>> = Vec::with_capacity(6);
    for p in &region.polygon {
        let v = PixelPoint::new(
            (p.x - x0 as f64).round() as i32,
            (p.y - y0 as f64).round() as i32,
        );
        if vertices.last() != Some(&v) {
            vertices.push(v);
        }
    }
    // draw_polygon_mut rejects a closed vertex list
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return None;
    }

    let mut mask = GrayImage::new(width, height);
    draw_polygon_mut(&mut mask, &vertices, Luma([255]));
    Some(mask)
}

/// Raw spatial moments of the polygon traced by a contour.
#[derive(Clone, Copy, Debug)]
struct Moments {
    m00: f64,
    m10: f64,
    m01: f64,
}

/// Green's theorem over the closed contour polygon. Orientation is
/// normalized so `m00` is never negative.
fn moments(contour: &Contour<i32>) -> Moments {
    let pts = &contour.points;
    let n = pts.len();
    let (mut a, mut sx, mut sy) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let (xi, yi) = (pts[i].x as f64, pts[i].y as f64);
        let j = (i + 1) % n;
        let (xj, yj) = (pts[j].x as f64, pts[j].y as f64);
        let cross = xi * yj - xj * yi;
        a += cross;
        sx += (xi + xj) * cross;
        sy += (yi + yj) * cross;
    }
    let sign = if a < 0.0 { -1.0 } else { 1.0 };
    Moments {
        m00: sign * a / 2.0,
        m10: sign * sx / 6.0,
        m01: sign * sy / 6.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::landmark_set::EyeRing;
    use crate::shared::geometry::Point;
    use approx::assert_abs_diff_eq;
    use image::{Rgb, RgbImage};
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
    use imageproc::rect::Rect;
    use rstest::rstest;

    fn localizer() -> ContourPupilLocalizer {
        ContourPupilLocalizer::new(55, 1, 2)
    }

    fn frame_from(img: RgbImage) -> Frame {
        let (w, h) = img.dimensions();
        Frame::new(img.into_raw(), w, h, 0)
    }

    /// Eye ring centred at (50, 30) with radius 20: box x 30..70.
    fn eye() -> EyeRegion {
        EyeRegion::from_ring(&EyeRing::circle(Point::new(50.0, 30.0), 20.0))
    }

    #[test]
    fn test_dark_disk_centroid_is_recovered() {
        let mut img = RgbImage::from_pixel(100, 60, Rgb([200, 200, 200]));
        draw_filled_circle_mut(&mut img, (44, 30), 5, Rgb([20, 20, 20]));

        let region = eye();
        let est = localizer().locate(&frame_from(img), &region);

        assert_abs_diff_eq!(est.x, (44.0 - 30.0) / 40.0, epsilon = 0.05);
        assert_abs_diff_eq!(est.y, 0.5, epsilon = 0.05);
    }

    #[test]
    fn test_disk_right_of_centre() {
        let mut img = RgbImage::from_pixel(100, 60, Rgb([200, 200, 200]));
        draw_filled_circle_mut(&mut img, (58, 32), 4, Rgb([10, 10, 10]));

        let region = eye();
        let est = localizer().locate(&frame_from(img), &region);
        let expected_y = (32.0 - region.bbox.y) / region.bbox.height;

        assert_abs_diff_eq!(est.x, 0.7, epsilon = 0.05);
        assert_abs_diff_eq!(est.y, expected_y, epsilon = 0.05);
    }

    /// Mid-grey (80) disk: dark only under a threshold of at least 80.
    #[rstest]
    #[case(55, false)]
    #[case(100, true)]
    fn test_configured_threshold_decides_what_is_dark(
        #[case] pupil_threshold: u8,
        #[case] found: bool,
    ) {
        let mut img = RgbImage::from_pixel(100, 60, Rgb([200, 200, 200]));
        draw_filled_circle_mut(&mut img, (44, 30), 5, Rgb([80, 80, 80]));
        let config = GazeConfig {
            pupil_threshold,
            ..Default::default()
        };

        let est = ContourPupilLocalizer::from_config(&config).locate(&frame_from(img), &eye());
        if found {
            assert_abs_diff_eq!(est.x, 0.35, epsilon = 0.05);
        } else {
            assert_eq!(est, PupilEstimate::CENTER);
        }
    }

    /// A 3x3 dark square survives an opening of reach 1 but not of reach 2.
    #[rstest]
    #[case(0, true)]
    #[case(1, true)]
    #[case(2, false)]
    fn test_configured_iterations_decide_what_survives_opening(
        #[case] morph_iterations: u32,
        #[case] found: bool,
    ) {
        let mut img = RgbImage::from_pixel(100, 60, Rgb([200, 200, 200]));
        draw_filled_rect_mut(&mut img, Rect::at(43, 29).of_size(3, 3), Rgb([10, 10, 10]));
        let config = GazeConfig {
            morph_iterations,
            ..Default::default()
        };

        let est = ContourPupilLocalizer::from_config(&config).locate(&frame_from(img), &eye());
        if found {
            assert_abs_diff_eq!(est.x, 0.35, epsilon = 0.05);
            assert_abs_diff_eq!(est.y, 0.5, epsilon = 0.05);
        } else {
            assert_eq!(est, PupilEstimate::CENTER);
        }
    }

    #[test]
    fn test_dark_pixels_outside_polygon_are_ignored() {
        let mut img = RgbImage::from_pixel(100, 60, Rgb([200, 200, 200]));
        // box corner, outside the hexagon
        draw_filled_circle_mut(&mut img, (32, 15), 2, Rgb([0, 0, 0]));
        let est = localizer().locate(&frame_from(img), &eye());
        assert_eq!(est, PupilEstimate::CENTER);
    }

    #[test]
    fn test_bright_eye_has_no_contour() {
        let img = RgbImage::from_pixel(100, 60, Rgb([255, 255, 255]));
        assert_eq!(localizer().locate(&frame_from(img), &eye()), PupilEstimate::CENTER);
    }

    #[test]
    fn test_zero_width_box_is_center() {
        let img = RgbImage::from_pixel(100, 60, Rgb([0, 0, 0]));
        let p = Point::new(40.0, 30.0);
        let region = EyeRegion::from_ring(&EyeRing([
            p,
            Point::new(40.0, 25.0),
            p,
            p,
            p,
            Point::new(40.0, 35.0),
        ]));
        assert_eq!(region.bbox.width, 0.0);
        assert_eq!(localizer().locate(&frame_from(img), &region), PupilEstimate::CENTER);
    }

    #[test]
    fn test_box_outside_frame_is_center() {
        let img = RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]));
        let region = EyeRegion::from_ring(&EyeRing::circle(Point::new(200.0, 200.0), 10.0));
        assert_eq!(localizer().locate(&frame_from(img), &region), PupilEstimate::CENTER);
    }

    #[test]
    fn test_estimate_stays_in_unit_square_on_textured_frames() {
        for seed in 0u32..8 {
            let img = RgbImage::from_fn(100, 60, |x, y| {
                let v = ((x * 31 + y * 17 + seed * 101) % 256) as u8;
                Rgb([v, v, v])
            });
            let est = localizer().locate(&frame_from(img), &eye());
            assert!((0.0..=1.0).contains(&est.x), "x out of range: {}", est.x);
            assert!((0.0..=1.0).contains(&est.y), "y out of range: {}", est.y);
        }
    }

    #[test]
    fn test_moments_of_square() {
        let contour = Contour {
            points: vec![
                PixelPoint::new(0, 0),
                PixelPoint::new(4, 0),
                PixelPoint::new(4, 2),
                PixelPoint::new(0, 2),
            ],
            border_type: BorderType::Outer,
            parent: None,
        };
        let m = moments(&contour);
        assert_abs_diff_eq!(m.m00, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.m10 / m.m00, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.m01 / m.m00, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_moments_ignore_orientation() {
        let contour = Contour {
            points: vec![
                PixelPoint::new(0, 0),
                PixelPoint::new(0, 2),
                PixelPoint::new(4, 2),
                PixelPoint::new(4, 0),
            ],
            border_type: BorderType::Outer,
            parent: None,
        };
        assert_abs_diff_eq!(moments(&contour).m00, 8.0, epsilon = 1e-9);
    }
}
