//! Image preprocessing for YOLO models
//!
//! Letterbox resizing and tensor conversion. YOLO exports expect a square
//! RGB input in NCHW layout with values scaled to 0-1.

use image::{imageops::FilterType, DynamicImage, Rgb, RgbImage};
use ndarray::Array4;

/// Gray value used for letterbox padding
pub const PAD_VALUE: u8 = 114;

/// Geometry of a letterboxed image relative to the original
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale applied to the original image
    pub scale: f32,
    /// Horizontal padding on the left edge (pixels)
    pub pad_x: u32,
    /// Vertical padding on the top edge (pixels)
    pub pad_y: u32,
}

/// Resize an image into a `target_size` square, preserving aspect ratio
/// Returns (padded_image, letterbox geometry)
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let rgb = image.to_rgb8();
    let (w, h) = rgb.dimensions();

    let scale = target_size as f32 / w.max(h).max(1) as f32;
    let new_w = ((w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image::imageops::resize(&rgb, new_w, new_h, FilterType::Triangle);

    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
    image::imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

    (canvas, Letterbox { scale, pad_x, pad_y })
}

/// Convert an RGB image to an NCHW tensor (batch size 1), normalized to 0-1
pub fn rgb_to_nchw(image: &RgbImage) -> Array4<f32> {
    let (w, h) = image.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, 3, h as usize, w as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel.0[c] as f32 / 255.0;
        }
    }

    tensor
}

/// Full preprocessing: letterbox then tensor conversion
pub fn prepare(image: &DynamicImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (padded, geometry) = letterbox(image, target_size);
    (rgb_to_nchw(&padded), geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_wide_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, Rgb([255, 0, 0])));
        let (padded, geometry) = letterbox(&img, 64);

        assert_eq!(padded.dimensions(), (64, 64));
        assert!((geometry.scale - 0.32).abs() < 1e-6);
        assert_eq!(geometry.pad_x, 0);
        assert_eq!(geometry.pad_y, 16);

        // Top band is padding, center is image content
        assert_eq!(padded.get_pixel(10, 2).0, [PAD_VALUE; 3]);
        assert_eq!(padded.get_pixel(32, 32).0, [255, 0, 0]);
    }

    #[test]
    fn test_letterbox_square_image_has_no_padding() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([10, 20, 30])));
        let (padded, geometry) = letterbox(&img, 64);

        assert_eq!(geometry.pad_x, 0);
        assert_eq!(geometry.pad_y, 0);
        assert!((geometry.scale - 2.0).abs() < 1e-6);
        assert_eq!(padded.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_rgb_to_nchw_layout() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));

        let tensor = rgb_to_nchw(&img);
        assert_eq!(tensor.shape(), &[1, 3, 1, 2]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 2, 0, 0]].abs() < 1e-6);
        assert!((tensor[[0, 2, 0, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_prepare_shape() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(40, 30));
        let (tensor, _) = prepare(&img, 32);
        assert_eq!(tensor.shape(), &[1, 3, 32, 32]);
    }
}
