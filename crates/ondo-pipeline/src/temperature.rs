//! Intensity-to-temperature conversion.
//!
//! Converts normalized pixel intensity in `[0, 1]` into an estimated
//! surface temperature via a fixed affine transform:
//!
//! ```text
//! temperature = intensity × scale + offset
//! ```
//!
//! The whole-image estimate additionally carries a fixed calibration
//! bias that per-region estimates do not. A borderline image can land
//! in a different tier depending on this asymmetry, so the two
//! mappings are kept as separate operations rather than folded into a
//! single parameterized one.

use serde::{Deserialize, Serialize};

/// Fixed affine intensity-to-temperature mapping.
///
/// Not a calibrated sensor model: the constants approximate the output
/// range of clinical thermal cameras and are configurable per
/// deployment, but there is no per-device calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureScale {
    /// Multiplier applied to normalized intensity.
    pub scale: f64,
    /// Additive offset in degrees Celsius.
    pub offset: f64,
    /// Calibration bias added to the whole-image estimate only.
    pub image_bias: f64,
}

impl TemperatureScale {
    /// Default intensity multiplier.
    pub const DEFAULT_SCALE: f64 = 25.0;
    /// Default additive offset.
    pub const DEFAULT_OFFSET: f64 = 20.0;
    /// Default whole-image calibration bias.
    pub const DEFAULT_IMAGE_BIAS: f64 = 6.0;

    /// Estimated temperature for a single region's mean intensity.
    #[must_use]
    pub fn region_estimate(&self, intensity: f64) -> f64 {
        intensity.mul_add(self.scale, self.offset)
    }

    /// Estimated temperature for the whole image's mean intensity.
    ///
    /// Applies the calibration bias on top of the affine transform.
    #[must_use]
    pub fn image_estimate(&self, intensity: f64) -> f64 {
        self.region_estimate(intensity) + self.image_bias
    }
}

impl Default for TemperatureScale {
    fn default() -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
            offset: Self::DEFAULT_OFFSET,
            image_bias: Self::DEFAULT_IMAGE_BIAS,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn region_estimate_is_affine() {
        let scale = TemperatureScale::default();
        for i in 0..=10 {
            let x = f64::from(i) / 10.0;
            let expected = x * 25.0 + 20.0;
            assert!(
                (scale.region_estimate(x) - expected).abs() < 1e-12,
                "region estimate diverged from the affine formula at {x}",
            );
        }
    }

    #[test]
    fn image_estimate_adds_bias() {
        let scale = TemperatureScale::default();
        for i in 0..=10 {
            let x = f64::from(i) / 10.0;
            let diff = scale.image_estimate(x) - scale.region_estimate(x);
            assert!((diff - 6.0).abs() < 1e-12);
        }
    }

    #[test]
    fn bias_is_not_applied_to_regions() {
        let scale = TemperatureScale::default();
        // 0.4 is the borderline case: 36.0 with bias, 30.0 without.
        assert!((scale.image_estimate(0.4) - 36.0).abs() < 1e-12);
        assert!((scale.region_estimate(0.4) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn default_constants() {
        let scale = TemperatureScale::default();
        assert!((scale.scale - 25.0).abs() < f64::EPSILON);
        assert!((scale.offset - 20.0).abs() < f64::EPSILON);
        assert!((scale.image_bias - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serde_round_trip() {
        let scale = TemperatureScale {
            scale: 30.0,
            offset: 15.0,
            image_bias: 2.5,
        };
        let json = serde_json::to_string(&scale).unwrap();
        let deserialized: TemperatureScale = serde_json::from_str(&json).unwrap();
        assert_eq!(scale, deserialized);
    }
}
