//! Image preprocessing
//!
//! Deterministic transform from uploaded image bytes to the model's input
//! tensor: decode, normalize channels, resize, scale to `[0, 1]`, add the
//! batch dimension.

mod transforms;

pub use transforms::{normalize_channels, resize, to_tensor};

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

use crate::error::{ClassifierError, Result};
use crate::model::InputShape;

/// Decode raw upload bytes, guessing the format from its magic number
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(ClassifierError::ImageDecode("image is empty".to_string()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Converts decoded images to tensors of one fixed input shape
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    shape: InputShape,
    filter: FilterType,
}

impl ImagePreprocessor {
    /// Bilinear resize, the default interpolation of the original pipeline
    pub fn new(shape: InputShape) -> Self {
        Self { shape, filter: FilterType::Triangle }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn shape(&self) -> InputShape {
        self.shape
    }

    pub fn transform(&self, image: &DynamicImage) -> Array4<f32> {
        let normalized = normalize_channels(image, self.shape.channels);
        let resized = resize(&normalized, self.shape.width, self.shape.height, self.filter);
        to_tensor(&resized, &self.shape)
    }

    /// Decode then transform
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<Array4<f32>> {
        let image = decode(bytes)?;
        Ok(self.transform(&image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn test_output_has_declared_shape() {
        let pre = ImagePreprocessor::new(InputShape::nhwc(16, 24, 3));
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 30, Rgb([10, 20, 30])));

        let tensor = pre.process_bytes(&png_bytes(image)).unwrap();
        assert_eq!(tensor.shape(), &[1, 16, 24, 3]);
    }

    #[test]
    fn test_values_within_unit_interval() {
        let pre = ImagePreprocessor::new(InputShape::nhwc(8, 8, 3));
        let image = RgbImage::from_fn(13, 7, |x, y| Rgb([(x * 19) as u8, (y * 36) as u8, 255]));

        let tensor = pre.transform(&DynamicImage::ImageRgb8(image));
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_rejects_garbage_bytes() {
        let pre = ImagePreprocessor::new(InputShape::nhwc(8, 8, 3));
        let err = pre.process_bytes(b"not an image at all").unwrap_err();
        assert!(matches!(err, ClassifierError::ImageDecode(_)));
    }

    #[test]
    fn test_rejects_empty_upload() {
        assert!(matches!(decode(&[]), Err(ClassifierError::ImageDecode(_))));
    }
}
