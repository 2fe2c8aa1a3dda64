//! ondo: one-shot thermal image analysis from the command line.
//!
//! Runs the same classification pipeline as the HTTP service on a
//! single image file and prints the JSON report to stdout. Useful for:
//!
//! - Tuning the edge threshold and tier boundaries against sample scans
//! - Inspecting the numeric report without standing up the server
//! - Rendering the false-color heatmap for a quick visual check
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin ondo -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ondo_pipeline::{AnalysisConfig, ImplicationTable, TierThresholds};

/// One-shot thermal image analysis.
///
/// Classifies a thermal/grayscale image into cold/normal/hot tiers and
/// prints the structured report as JSON.
#[derive(Parser)]
#[command(name = "ondo", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Body part the image shows, for advisory lookup.
    #[arg(long, default_value = "default")]
    body_part: String,

    /// Gradient-magnitude cutoff for segmentation.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_EDGE_THRESHOLD)]
    edge_threshold: f32,

    /// Whole-image lower tier boundary.
    #[arg(long, default_value_t = TierThresholds::IMAGE_DEFAULT.low())]
    image_low: f64,

    /// Whole-image upper tier boundary.
    #[arg(long, default_value_t = TierThresholds::IMAGE_DEFAULT.high())]
    image_high: f64,

    /// Per-region lower tier boundary.
    #[arg(long, default_value_t = TierThresholds::REGION_DEFAULT.low())]
    region_low: f64,

    /// Per-region upper tier boundary.
    #[arg(long, default_value_t = TierThresholds::REGION_DEFAULT.high())]
    region_high: f64,

    /// TOML file overriding the built-in implication table.
    #[arg(long)]
    implications: Option<PathBuf>,

    /// Write the jet heatmap JPEG to this path as well.
    #[arg(long)]
    heatmap: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

/// Build an [`AnalysisConfig`] from CLI arguments.
fn config_from_cli(cli: &Cli) -> Result<AnalysisConfig, String> {
    let image_thresholds = TierThresholds::new(cli.image_low, cli.image_high)
        .map_err(|e| format!("Invalid --image-low/--image-high: {e}"))?;
    let region_thresholds = TierThresholds::new(cli.region_low, cli.region_high)
        .map_err(|e| format!("Invalid --region-low/--region-high: {e}"))?;
    let implications = match &cli.implications {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
            ImplicationTable::from_toml_str(&raw)
                .map_err(|e| format!("Invalid implication table {}: {e}", path.display()))?
        }
        None => ImplicationTable::builtin(),
    };

    Ok(AnalysisConfig {
        edge_threshold: cli.edge_threshold,
        image_thresholds,
        region_thresholds,
        implications,
        ..AnalysisConfig::default()
    })
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = config_from_cli(cli)?;

    let bytes = std::fs::read(&cli.image_path)
        .map_err(|e| format!("Error reading {}: {e}", cli.image_path.display()))?;

    let report = ondo_pipeline::analyze(&bytes, &cli.body_part, &config)
        .map_err(|e| format!("Analysis failed: {e}"))?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| format!("Error serializing report: {e}"))?;
    println!("{json}");

    if let Some(path) = &cli.heatmap {
        let jpeg =
            ondo_render::heatmap_jpeg(&bytes).map_err(|e| format!("Heatmap failed: {e}"))?;
        std::fs::write(path, jpeg)
            .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
        eprintln!("heatmap written to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
