//! ondo-pipeline: Pure thermal image classification pipeline (sans-IO).
//!
//! Converts a single thermal/grayscale image into a structured
//! screening result through:
//! decode -> edge segmentation -> temperature mapping ->
//! tier classification -> implication lookup -> report assembly.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. HTTP transport, upload
//! handling, and the narrative collaborator live in `ondo-server` and
//! `ondo-narrative`.

pub mod classify;
pub mod decode;
pub mod implications;
pub mod report;
pub mod segment;
pub mod temperature;
pub mod types;

pub use classify::{ImageClassification, TemperatureTier, TierThresholds};
pub use implications::ImplicationTable;
pub use report::AnalysisReport;
pub use temperature::TemperatureScale;
pub use types::{
    AnalysisConfig, ConfigError, EdgeMap, IntensityGrid, PipelineError, Region, RegionHistogram,
};

/// Run the full classification pipeline on one image.
///
/// Takes raw image bytes, the requested body part, and the analysis
/// configuration, and produces an [`AnalysisReport`]. Data flows
/// strictly forward through the stages; no stage mutates another's
/// output, and re-running on identical input and configuration yields
/// an identical report.
///
/// # Pipeline steps
///
/// 1. Decode into the normalized intensity grid
/// 2. Edge-based segmentation into labeled regions
/// 3. Whole-image temperature estimate (biased) and verdict
/// 4. Per-region temperature estimates (unbiased) into the histogram
/// 5. Advisory text lookup for the body part at the image tier
/// 6. Report assembly
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty,
/// [`PipelineError::ImageDecode`] if the bytes are not a parsable
/// image, and [`PipelineError::DegenerateDimensions`] for a zero-sized
/// image. A segmentation that finds no regions is not an error.
pub fn analyze(
    image_bytes: &[u8],
    body_part: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, PipelineError> {
    // 1. Decode.
    let grid = decode::decode_to_grid(image_bytes)?;

    // 2. Segment.
    let regions = segment::segment(&grid, config.edge_threshold);

    // 3. Whole-image estimate and verdict. The calibration bias
    // applies here and only here.
    let estimate = config.temperature.image_estimate(grid.mean());
    let classification = classify::classify_image(estimate, &config.image_thresholds);

    // 4. Per-region estimates into the tier histogram.
    let histogram = classify::classify_regions(
        regions
            .iter()
            .map(|region| config.temperature.region_estimate(region.mean_intensity)),
        &config.region_thresholds,
    );

    // 5. Advisory text.
    let implications = config
        .implications
        .resolve(body_part, classification.tier)
        .to_owned();

    // 6. Assemble.
    Ok(AnalysisReport::assemble(
        regions.len(),
        classification,
        histogram,
        implications,
    ))
}
