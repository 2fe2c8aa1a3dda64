//! Image decoding into the normalized intensity grid.
//!
//! First pipeline stage: raw bytes in (PNG, JPEG, BMP, WebP, whatever
//! the `image` crate can decode), [`IntensityGrid`] out. Color input is
//! reduced with the standard luminance weights
//! (`0.299*R + 0.587*G + 0.114*B`) before normalization to `[0, 1]`.

use crate::types::{IntensityGrid, PipelineError};

/// Decode raw image bytes into a normalized intensity grid.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty,
/// [`PipelineError::ImageDecode`] if the bytes are not a parsable
/// image, and [`PipelineError::DegenerateDimensions`] if the decoded
/// image has zero width or height.
#[must_use = "returns the decoded intensity grid"]
pub fn decode_to_grid(bytes: &[u8]) -> Result<IntensityGrid, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let gray = image::load_from_memory(bytes)?.to_luma8();
    IntensityGrid::from_luma(&gray)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: encode a grayscale image as a PNG byte buffer.
    fn encode_gray_png(image: &image::GrayImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode_to_grid(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_return_image_decode_error() {
        let result = decode_to_grid(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn valid_png_decodes_with_matching_dimensions() {
        let image = image::GrayImage::from_pixel(17, 31, image::Luma([128]));
        let grid = decode_to_grid(&encode_gray_png(&image)).unwrap();
        assert_eq!(grid.width(), 17);
        assert_eq!(grid.height(), 31);
    }

    #[test]
    fn pixel_values_normalize_to_unit_range() {
        let mut image = image::GrayImage::new(2, 1);
        image.put_pixel(0, 0, image::Luma([0]));
        image.put_pixel(1, 0, image::Luma([255]));
        let grid = decode_to_grid(&encode_gray_png(&image)).unwrap();
        assert!(grid.get(0, 0).abs() < f32::EPSILON);
        assert!((grid.get(1, 0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rgb_input_reduces_to_single_channel() {
        let image = image::RgbImage::from_pixel(3, 3, image::Rgb([10, 200, 30]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();

        let grid = decode_to_grid(&buf).unwrap();
        // Weighted luminance of a green-dominant pixel sits between
        // the extremes, not at either channel value.
        let value = grid.get(1, 1);
        assert!(value > 10.0 / 255.0);
        assert!(value < 200.0 / 255.0);
    }
}
