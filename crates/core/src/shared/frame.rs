use image::{GrayImage, Pixel, Rgb, RgbImage};
use ndarray::ArrayView3;

use super::error::GazeError;

/// Pixel layouts accepted at the decode boundary.
///
/// Everything is converted to RGB once, in [`Frame::from_raw`], so no stage
/// downstream ever has to reason about channel order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb8,
    Bgr8,
    Rgba8,
    Gray8,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Rgb8 | PixelLayout::Bgr8 => 3,
            PixelLayout::Rgba8 => 4,
            PixelLayout::Gray8 => 1,
        }
    }
}

/// A single camera frame: contiguous RGB bytes in row-major order.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub const CHANNELS: u8 = 3;

    /// Wraps RGB bytes that are already in the canonical layout. Callers
    /// outside the crate go through [`Frame::from_raw`] or [`Frame::decode`].
    pub(crate) fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 3,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// Validates a raw pixel buffer and converts it to RGB.
    pub fn from_raw(
        data: &[u8],
        width: u32,
        height: u32,
        layout: PixelLayout,
        index: usize,
    ) -> Result<Self, GazeError> {
        if width == 0 || height == 0 {
            return Err(GazeError::Decode(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = (width as usize) * (height as usize) * layout.channels();
        if data.len() != expected {
            return Err(GazeError::Decode(format!(
                "expected {expected} bytes for {width}x{height} {layout:?}, got {}",
                data.len()
            )));
        }

        let rgb = match layout {
            PixelLayout::Rgb8 => data.to_vec(),
            PixelLayout::Bgr8 => data
                .chunks_exact(3)
                .flat_map(|px| [px[2], px[1], px[0]])
                .collect(),
            PixelLayout::Rgba8 => data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
            PixelLayout::Gray8 => data.iter().flat_map(|&v| [v, v, v]).collect(),
        };
        Ok(Self::new(rgb, width, height, index))
    }

    /// Decodes an encoded image (JPEG, PNG, ...) into an RGB frame.
    pub fn decode(bytes: &[u8], index: usize) -> Result<Self, GazeError> {
        let img = image::load_from_memory(bytes).map_err(|e| GazeError::Decode(e.to_string()))?;
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(GazeError::Decode("image has no pixels".into()));
        }
        Ok(Self::new(rgb.into_raw(), width, height, index))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        Self::CHANNELS
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, 3),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .expect("Frame data length must match dimensions")
    }

    /// RGB copy of the given window, clipped to the frame.
    pub fn rgb_region(&self, x: u32, y: u32, width: u32, height: u32) -> RgbImage {
        let (w, h) = self.clip(x, y, width, height);
        RgbImage::from_fn(w, h, |cx, cy| {
            let idx = self.offset(x + cx, y + cy);
            Rgb([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
        })
    }

    pub fn to_gray_image(&self) -> GrayImage {
        self.gray_region(0, 0, self.width, self.height)
    }

    /// Intensity image of the given window, clipped to the frame.
    ///
    /// Returns an empty image when the window lies entirely outside.
    pub fn gray_region(&self, x: u32, y: u32, width: u32, height: u32) -> GrayImage {
        let (w, h) = self.clip(x, y, width, height);
        GrayImage::from_fn(w, h, |cx, cy| {
            let idx = self.offset(x + cx, y + cy);
            Rgb([self.data[idx], self.data[idx + 1], self.data[idx + 2]]).to_luma()
        })
    }

    fn clip(&self, x: u32, y: u32, width: u32, height: u32) -> (u32, u32) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        (x_end.saturating_sub(x), y_end.saturating_sub(y))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * self.width as usize + x as usize) * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_is_empty() {
        assert!(Frame::new(Vec::new(), 0, 0, 0).is_empty());
        assert!(Frame::new(Vec::new(), 4, 0, 0).is_empty());
        assert!(!Frame::new(vec![0u8; 12], 2, 2, 0).is_empty());
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        let mut data = vec![0u8; 12];
        data[6] = 255; // row=1, col=0, R
        let frame = Frame::new(data, 2, 2, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_from_raw_bgr_swaps_to_rgb() {
        let frame = Frame::from_raw(&[1, 2, 3, 4, 5, 6], 2, 1, PixelLayout::Bgr8, 0).unwrap();
        assert_eq!(frame.data(), &[3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_from_raw_rgba_drops_alpha() {
        let frame = Frame::from_raw(&[10, 20, 30, 255], 1, 1, PixelLayout::Rgba8, 0).unwrap();
        assert_eq!(frame.data(), &[10, 20, 30]);
    }

    #[test]
    fn test_from_raw_gray_replicates_channels() {
        let frame = Frame::from_raw(&[7, 9], 2, 1, PixelLayout::Gray8, 0).unwrap();
        assert_eq!(frame.data(), &[7, 7, 7, 9, 9, 9]);
    }

    #[rstest]
    #[case(vec![0u8; 5], 2, 1)]
    #[case(vec![], 0, 0)]
    #[case(vec![0u8; 6], 0, 2)]
    fn test_from_raw_rejects_bad_buffers(#[case] data: Vec<u8>, #[case] w: u32, #[case] h: u32) {
        let result = Frame::from_raw(&data, w, h, PixelLayout::Rgb8, 0);
        assert!(matches!(result, Err(GazeError::Decode(_))));
    }

    #[test]
    fn test_decode_png_roundtrip() {
        let mut img = RgbImage::new(4, 3);
        for p in img.pixels_mut() {
            *p = Rgb([50, 100, 200]);
        }
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        let frame = Frame::decode(&bytes, 3).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.index(), 3);
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result = Frame::decode(b"definitely not an image", 0);
        assert!(matches!(result, Err(GazeError::Decode(_))));
    }

    #[test]
    fn test_gray_region_clips_to_frame() {
        let frame = Frame::new(vec![255u8; 4 * 4 * 3], 4, 4, 0);
        let roi = frame.gray_region(2, 3, 10, 10);
        assert_eq!(roi.dimensions(), (2, 1));
        assert_eq!(roi.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn test_gray_region_outside_is_empty() {
        let frame = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, 0);
        let roi = frame.gray_region(10, 10, 3, 3);
        assert_eq!(roi.dimensions(), (0, 0));
    }

    #[test]
    fn test_rgb_region_copies_window() {
        let data: Vec<u8> = (0..(3 * 2 * 3) as u8).collect(); // 3x2
        let frame = Frame::new(data, 3, 2, 0);
        let roi = frame.rgb_region(1, 1, 5, 5);
        assert_eq!(roi.dimensions(), (2, 1));
        assert_eq!(roi.get_pixel(0, 0).0, [12, 13, 14]);
    }

    #[test]
    fn test_to_rgb_image_preserves_pixels() {
        let frame = Frame::from_raw(&[1, 2, 3, 4, 5, 6], 2, 1, PixelLayout::Rgb8, 0).unwrap();
        let img = frame.to_rgb_image();
        assert_eq!(img.get_pixel(1, 0).0, [4, 5, 6]);
    }
}
