//! Jet colormap: grayscale intensity to false color.
//!
//! The classic blue→cyan→yellow→red ramp. Each channel is a clamped
//! triangle wave over the normalized input:
//!
//! ```text
//! r = clamp(1.5 - |4x - 3|)
//! g = clamp(1.5 - |4x - 2|)
//! b = clamp(1.5 - |4x - 1|)
//! ```
//!
//! which reproduces the familiar endpoints: 0 maps to dark blue
//! `(0, 0, 128)` and 1 to dark red `(128, 0, 0)`.

use image::{GrayImage, Rgb, RgbImage};

/// Jet color for a single 8-bit intensity.
#[must_use]
pub fn jet_color(value: u8) -> Rgb<u8> {
    let x = f32::from(value) / 255.0;
    let channel = |center: f32| -> u8 {
        let v = (1.5 - (4.0 * x - center).abs()).clamp(0.0, 1.0);
        // 0.0..=1.0 scaled into 0..=255; the clamp above keeps the
        // cast in range.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (v * 255.0).round() as u8;
        scaled
    };
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

/// Apply the jet ramp to every pixel of a grayscale image.
#[must_use]
pub fn render_jet(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        jet_color(gray.get_pixel(x, y).0[0])
    })
}
