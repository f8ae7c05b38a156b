//! Individual preprocessing steps

use image::{imageops, imageops::FilterType, DynamicImage};
use ndarray::Array4;

use crate::model::{InputShape, TensorLayout};

/// Convert any decoded color type to 8-bit RGB (or luma for single-channel
/// models). Alpha is dropped. The decoder already yields RGB order, so no
/// channel swap happens here.
pub fn normalize_channels(image: &DynamicImage, channels: usize) -> DynamicImage {
    if channels == 1 {
        match image {
            DynamicImage::ImageLuma8(_) => image.clone(),
            _ => DynamicImage::ImageLuma8(image.to_luma8()),
        }
    } else {
        match image {
            DynamicImage::ImageRgb8(_) => image.clone(),
            _ => DynamicImage::ImageRgb8(image.to_rgb8()),
        }
    }
}

/// Resize to exactly `width` x `height`, ignoring aspect ratio
pub fn resize(image: &DynamicImage, width: usize, height: usize, filter: FilterType) -> DynamicImage {
    let (w, h) = (width as u32, height as u32);
    if image.width() == w && image.height() == h {
        return image.clone();
    }
    match image {
        DynamicImage::ImageLuma8(luma) => DynamicImage::ImageLuma8(imageops::resize(luma, w, h, filter)),
        _ => DynamicImage::ImageRgb8(imageops::resize(&image.to_rgb8(), w, h, filter)),
    }
}

/// Scale 8-bit samples to `[0, 1]` and lay them out with batch size 1.
///
/// `image` must already have the shape's size and channel count.
pub fn to_tensor(image: &DynamicImage, shape: &InputShape) -> Array4<f32> {
    let channels = shape.channels;
    let raw: &[u8] = image.as_bytes();
    let sample = |y: usize, x: usize, c: usize| raw[(y * shape.width + x) * channels + c] as f32 / 255.0;

    match shape.layout {
        TensorLayout::Nhwc => {
            Array4::from_shape_fn((1, shape.height, shape.width, channels), |(_, y, x, c)| sample(y, x, c))
        }
        TensorLayout::Nchw => {
            Array4::from_shape_fn((1, channels, shape.height, shape.width), |(_, c, y, x)| sample(y, x, c))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_grayscale_expanded_to_rgb() {
        let gray = DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(4, 4, LumaA([128, 7])));
        let rgb = normalize_channels(&gray, 3);
        assert_eq!(rgb.color().channel_count(), 3);
        assert_eq!(rgb.to_rgb8().get_pixel(0, 0), &Rgb([128, 128, 128]));
    }

    #[test]
    fn test_alpha_dropped() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 0])));
        let rgb = normalize_channels(&rgba, 3);
        assert_eq!(rgb.to_rgb8().get_pixel(1, 1), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_no_channel_swap() {
        let shape = InputShape::nhwc(1, 1, 3);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 0, 51])));
        let tensor = to_tensor(&image, &shape);
        assert_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 0.0);
        assert!((tensor[[0, 0, 0, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_channels_first_layout() {
        let shape = InputShape::nchw(2, 3, 3);
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 255])));
        let tensor = to_tensor(&image, &shape);

        assert_eq!(tensor.shape(), &[1, 3, 2, 3]);
        assert_eq!(tensor[[0, 0, 1, 2]], 2.0 / 255.0);
        assert_eq!(tensor[[0, 1, 1, 2]], 1.0 / 255.0);
        assert_eq!(tensor[[0, 2, 0, 0]], 1.0);
    }

    #[test]
    fn test_resize_to_target() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let resized = resize(&image, 224, 224, FilterType::Triangle);
        assert_eq!((resized.width(), resized.height()), (224, 224));
    }
}
