//! Shared types for the ondo classification pipeline.

use serde::{Deserialize, Serialize};

use crate::classify::{TemperatureTier, TierThresholds};
use crate::implications::ImplicationTable;
use crate::temperature::TemperatureScale;

/// Re-export `GrayImage` so downstream crates can reference raster
/// intermediates without depending on `image` directly.
pub use image::GrayImage;

/// Single-channel intensity grid normalized to `[0, 1]`.
///
/// Produced once per request by the loader; every later stage reads it
/// and none mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityGrid {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl IntensityGrid {
    /// Build a grid from an 8-bit grayscale image, normalizing each
    /// pixel to `value / 255`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DegenerateDimensions`] if either
    /// dimension is zero.
    pub fn from_luma(image: &GrayImage) -> Result<Self, PipelineError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::DegenerateDimensions { width, height });
        }
        let data = image
            .as_raw()
            .iter()
            .map(|&value| f32::from(value) / 255.0)
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels. Always nonzero.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels. Always nonzero.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Intensity at `(x, y)`. Caller must stay in bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    /// Mean intensity over the whole grid.
    #[must_use]
    pub fn mean(&self) -> f64 {
        let sum: f64 = self.data.iter().copied().map(f64::from).sum();
        sum / (f64::from(self.width) * f64::from(self.height))
    }
}

/// Gradient-magnitude response over an [`IntensityGrid`].
///
/// Same dimensions as the source grid, values in `[0, 1]`; immutable
/// once computed.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl EdgeMap {
    pub(crate) fn new(width: u32, height: u32, data: Vec<f32>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Edge response at `(x, y)`. Caller must stay in bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    /// Binary mask of the response: 255 where the response is strictly
    /// above `cutoff`, 0 elsewhere.
    #[must_use]
    pub fn threshold(&self, cutoff: f32) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([if self.get(x, y) > cutoff { 255 } else { 0 }])
        })
    }
}

/// A labeled connected component of the thresholded edge map.
///
/// Produced once per request and never mutated; the lifetime is the
/// request.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Unique label, monotonically increasing from 1.
    pub label: u32,
    /// Member pixel coordinates as `(x, y)`.
    pub pixels: Vec<(u32, u32)>,
    /// Mean source-grid intensity over the member pixels.
    pub mean_intensity: f64,
}

/// Count of regions per tier.
///
/// The counts always sum to the number of classified regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionHistogram {
    /// Regions below the lower region boundary.
    pub cold: usize,
    /// Regions between the boundaries.
    pub normal: usize,
    /// Regions above the upper region boundary.
    pub hot: usize,
}

impl RegionHistogram {
    /// Count one region in the given tier.
    pub fn record(&mut self, tier: TemperatureTier) {
        match tier {
            TemperatureTier::Cold => self.cold += 1,
            TemperatureTier::Normal => self.normal += 1,
            TemperatureTier::Hot => self.hot += 1,
        }
    }

    /// Total number of counted regions.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.cold + self.normal + self.hot
    }
}

/// Immutable configuration for the analysis pipeline.
///
/// Constructed once at process start and shared read-only across
/// requests; no pipeline stage mutates it, so no locking is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Cutoff applied to the gradient-magnitude map when building the
    /// binary segmentation mask.
    pub edge_threshold: f32,

    /// Affine intensity-to-temperature mapping.
    pub temperature: TemperatureScale,

    /// Boundaries for the whole-image verdict.
    pub image_thresholds: TierThresholds,

    /// Boundaries for per-region histogram counting.
    ///
    /// Configured independently of `image_thresholds`; the defaults
    /// differ on purpose.
    pub region_thresholds: TierThresholds,

    /// Body-part advisory table.
    pub implications: ImplicationTable,
}

impl AnalysisConfig {
    /// Default gradient-magnitude cutoff.
    pub const DEFAULT_EDGE_THRESHOLD: f32 = 0.1;
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            edge_threshold: Self::DEFAULT_EDGE_THRESHOLD,
            temperature: TemperatureScale::default(),
            image_thresholds: TierThresholds::IMAGE_DEFAULT,
            region_thresholds: TierThresholds::REGION_DEFAULT,
            implications: ImplicationTable::builtin(),
        }
    }
}

/// Errors that can occur while processing one image.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The decoded image has a zero dimension.
    #[error("degenerate image dimensions: {width}x{height}")]
    DegenerateDimensions {
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },
}

/// Configuration-integrity faults.
///
/// These are caught when configuration is constructed or loaded at
/// process start, never at request time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A threshold pair with `low > high` cannot partition the line.
    #[error("invalid tier thresholds: low {low} exceeds high {high}")]
    InvertedThresholds {
        /// Offending lower boundary.
        low: f64,
        /// Offending upper boundary.
        high: f64,
    },

    /// The implication table has no reserved fallback entry.
    #[error("implication table has no \"default\" entry")]
    MissingDefault,

    /// An implication entry resolves to empty text for some tier.
    #[error("implication table entry \"{key}\" has empty advice for the {tier} tier")]
    EmptyAdvice {
        /// Offending body-part key.
        key: String,
        /// Tier with the empty text.
        tier: TemperatureTier,
    },

    /// The implication table override failed to parse.
    #[error("failed to parse implication table: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uniform_gray(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, image::Luma([value]))
    }

    // --- IntensityGrid tests ---

    #[test]
    fn grid_normalizes_to_unit_range() {
        let grid = IntensityGrid::from_luma(&uniform_gray(4, 4, 255)).unwrap();
        assert!((grid.get(0, 0) - 1.0).abs() < f32::EPSILON);

        let grid = IntensityGrid::from_luma(&uniform_gray(4, 4, 0)).unwrap();
        assert!(grid.get(3, 3).abs() < f32::EPSILON);
    }

    #[test]
    fn grid_mid_gray_value() {
        // 102/255 = 0.4, the borderline value used across the suite.
        let grid = IntensityGrid::from_luma(&uniform_gray(2, 2, 102)).unwrap();
        assert!((grid.get(1, 1) - 0.4).abs() < 1e-6);
        assert!((grid.mean() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn grid_rejects_zero_width() {
        let result = IntensityGrid::from_luma(&GrayImage::new(0, 5));
        assert!(matches!(
            result,
            Err(PipelineError::DegenerateDimensions {
                width: 0,
                height: 5
            })
        ));
    }

    #[test]
    fn grid_rejects_zero_height() {
        let result = IntensityGrid::from_luma(&GrayImage::new(5, 0));
        assert!(matches!(
            result,
            Err(PipelineError::DegenerateDimensions { .. })
        ));
    }

    #[test]
    fn grid_mean_of_mixed_values() {
        let mut image = uniform_gray(2, 1, 0);
        image.put_pixel(1, 0, image::Luma([255]));
        let grid = IntensityGrid::from_luma(&image).unwrap();
        assert!((grid.mean() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn grid_dimensions_preserved() {
        let grid = IntensityGrid::from_luma(&uniform_gray(17, 31, 7)).unwrap();
        assert_eq!(grid.width(), 17);
        assert_eq!(grid.height(), 31);
    }

    // --- EdgeMap tests ---

    #[test]
    fn threshold_is_strict_inequality() {
        let edges = EdgeMap::new(2, 1, vec![0.1, 0.100_01]);
        let mask = edges.threshold(0.1);
        // Exactly at the cutoff is background, strictly above is edge.
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
        assert_eq!(mask.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn threshold_preserves_dimensions() {
        let edges = EdgeMap::new(3, 2, vec![0.0; 6]);
        let mask = edges.threshold(0.1);
        assert_eq!(mask.dimensions(), (3, 2));
    }

    // --- RegionHistogram tests ---

    #[test]
    fn histogram_records_and_totals() {
        let mut histogram = RegionHistogram::default();
        histogram.record(TemperatureTier::Cold);
        histogram.record(TemperatureTier::Hot);
        histogram.record(TemperatureTier::Hot);
        assert_eq!(histogram.cold, 1);
        assert_eq!(histogram.normal, 0);
        assert_eq!(histogram.hot, 2);
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn histogram_serde_field_names() {
        let histogram = RegionHistogram {
            cold: 1,
            normal: 2,
            hot: 3,
        };
        let json = serde_json::to_string(&histogram).unwrap();
        assert_eq!(json, r#"{"cold":1,"normal":2,"hot":3}"#);
    }

    // --- AnalysisConfig tests ---

    #[test]
    fn config_default_constants() {
        let config = AnalysisConfig::default();
        assert!((config.edge_threshold - 0.1).abs() < f32::EPSILON);
        assert!((config.temperature.scale - 25.0).abs() < f64::EPSILON);
        assert!((config.image_thresholds.low() - 29.0).abs() < f64::EPSILON);
        assert!((config.region_thresholds.low() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = AnalysisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    // --- Error display tests ---

    #[test]
    fn error_empty_input_display() {
        assert_eq!(
            PipelineError::EmptyInput.to_string(),
            "input image data is empty",
        );
    }

    #[test]
    fn error_degenerate_dimensions_display() {
        let err = PipelineError::DegenerateDimensions {
            width: 0,
            height: 12,
        };
        assert_eq!(err.to_string(), "degenerate image dimensions: 0x12");
    }

    #[test]
    fn config_error_empty_advice_display() {
        let err = ConfigError::EmptyAdvice {
            key: "head".to_owned(),
            tier: TemperatureTier::Cold,
        };
        assert_eq!(
            err.to_string(),
            "implication table entry \"head\" has empty advice for the cold tier",
        );
    }
}
