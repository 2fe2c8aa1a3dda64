//! ondo-render: False-color heatmap rendering (sans-IO).
//!
//! Converts a grayscale thermal image into a jet-colormapped JPEG.
//! This is the whole body of the heatmap endpoint: no classification
//! or decision logic, just a per-pixel color ramp and an encoder.

pub mod jet;

pub use jet::{jet_color, render_jet};

use image::RgbImage;

/// Errors that can occur while rendering a heatmap.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Failed to encode the rendered heatmap.
    #[error("failed to encode heatmap jpeg: {0}")]
    JpegEncode(#[source] image::ImageError),
}

/// Encode an RGB image as JPEG bytes.
///
/// # Errors
///
/// Returns [`RenderError::JpegEncode`] if the encoder fails.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )
    .map_err(RenderError::JpegEncode)?;
    Ok(buf)
}

/// Render a jet-colormapped JPEG heatmap from raw image bytes.
///
/// Decodes the input (converting to grayscale if needed), applies the
/// jet ramp per pixel, and encodes the result as JPEG. Output
/// dimensions match the input.
///
/// # Errors
///
/// Returns [`RenderError::EmptyInput`] if `bytes` is empty,
/// [`RenderError::ImageDecode`] if the bytes are not a parsable image,
/// and [`RenderError::JpegEncode`] if encoding fails.
pub fn heatmap_jpeg(bytes: &[u8]) -> Result<Vec<u8>, RenderError> {
    if bytes.is_empty() {
        return Err(RenderError::EmptyInput);
    }
    let gray = image::load_from_memory(bytes)?.to_luma8();
    encode_jpeg(&render_jet(&gray))
}
