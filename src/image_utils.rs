use image::{DynamicImage, RgbImage};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

const LUMA_RED: f64 = 0.299;
const LUMA_GREEN: f64 = 0.587;
const LUMA_BLUE: f64 = 0.114;

/// One pixel in the working color space. Values keep the 0..=255 range of the
/// source but stay real-valued through the transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub luma: f64,
}

impl Sample {
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        let (r, g, b) = (red as f64, green as f64, blue as f64);

        Self {
            red: r,
            green: g,
            blue: b,
            luma: rgb_to_luma(r, g, b),
        }
    }
}

pub fn rgb_to_luma(red: f64, green: f64, blue: f64) -> f64 {
    LUMA_RED * red + LUMA_GREEN * green + LUMA_BLUE * blue
}

/// Read-only access to decoded samples.
///
/// Coordinates are always inside `0..width() x 0..height()`; callers never ask
/// for samples outside the image.
pub trait PixelSource {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn sample_at(&self, x: u32, y: u32) -> Sample;

    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

impl<S: PixelSource + ?Sized> PixelSource for &S {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn sample_at(&self, x: u32, y: u32) -> Sample {
        (**self).sample_at(x, y)
    }
}

impl PixelSource for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn sample_at(&self, x: u32, y: u32) -> Sample {
        let pixel = self.get_pixel(x, y);
        Sample::from_rgb(pixel[0], pixel[1], pixel[2])
    }
}

/// Color-converted copy of an image, stored row-major as `[[y, x]]`.
#[derive(Debug, Clone)]
pub struct SampleImage {
    samples: Array2<Sample>,
}

impl SampleImage {
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let samples = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            let pixel = image.get_pixel(x as u32, y as u32);
            Sample::from_rgb(pixel[0], pixel[1], pixel[2])
        });

        Self { samples }
    }

    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self::from_rgb(&image.to_rgb8())
    }
}

impl PixelSource for SampleImage {
    fn width(&self) -> u32 {
        self.samples.ncols() as u32
    }

    fn height(&self) -> u32 {
        self.samples.nrows() as u32
    }

    fn sample_at(&self, x: u32, y: u32) -> Sample {
        self.samples[[y as usize, x as usize]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_luma_of_gray_is_gray() {
        let sample = Sample::from_rgb(128, 128, 128);
        assert!((sample.luma - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_image_matches_rgb_source() {
        let mut rgb = RgbImage::new(3, 2);
        rgb.put_pixel(2, 1, Rgb([10, 20, 30]));

        let samples = SampleImage::from_rgb(&rgb);

        assert_eq!(samples.dimensions(), (3, 2));
        assert_eq!(samples.sample_at(2, 1), rgb.sample_at(2, 1));
        assert_eq!(samples.sample_at(2, 1).red, 10.0);
        assert_eq!(samples.sample_at(0, 0), Sample::default());
    }
}
