//! ondo-server: HTTP front end for the thermal analysis pipeline.
//!
//! Exposes `POST /analyze` (structured classification of one thermal
//! image) and `POST /generateHeatmap` (false-color rendering). All
//! configuration is fixed at startup; a malformed implication table
//! refuses to boot rather than failing requests later.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ondo_narrative::{FailurePolicy, NarrativeClient, NarrativeConfig};
use ondo_pipeline::{AnalysisConfig, ImplicationTable};
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;
mod upload;

use state::AppState;

/// Environment variable holding the narrative API key. The narrative
/// collaborator is disabled when it is absent or empty.
const API_KEY_VAR: &str = "ONDO_NARRATIVE_API_KEY";

/// HTTP service for thermal image screening.
#[derive(Parser)]
#[command(name = "ondo-server", version)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Directory uploads are spooled into.
    #[arg(long, default_value = "uploads")]
    upload_dir: PathBuf,

    /// Directory rendered heatmaps are written into.
    #[arg(long, default_value = "heatmaps")]
    heatmap_dir: PathBuf,

    /// Gradient-magnitude cutoff for segmentation.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_EDGE_THRESHOLD)]
    edge_threshold: f32,

    /// TOML file overriding the built-in implication table.
    #[arg(long)]
    implications: Option<PathBuf>,

    /// Narrative collaborator endpoint URL.
    #[arg(long)]
    narrative_endpoint: Option<String>,

    /// Narrative call timeout in seconds.
    #[arg(long, default_value_t = 10)]
    narrative_timeout_secs: u64,

    /// What a narrative failure means for the request.
    #[arg(long, value_enum, default_value_t = Policy::Degrade)]
    narrative_policy: Policy,
}

/// Narrative failure policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// Return the numeric report without the narrative.
    Degrade,
    /// Fail the request when the collaborator fails.
    Propagate,
}

impl From<Policy> for FailurePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Degrade => Self::Degrade,
            Policy::Propagate => Self::Propagate,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configuration-integrity faults surface here, before the first
    // request is accepted.
    let implications = match &cli.implications {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading implication table {}", path.display()))?;
            ImplicationTable::from_toml_str(&raw)
                .with_context(|| format!("validating implication table {}", path.display()))?
        }
        None => ImplicationTable::builtin(),
    };

    let config = AnalysisConfig {
        edge_threshold: cli.edge_threshold,
        implications,
        ..AnalysisConfig::default()
    };

    let mut narrative_config = NarrativeConfig {
        timeout: Duration::from_secs(cli.narrative_timeout_secs),
        policy: cli.narrative_policy.into(),
        ..NarrativeConfig::default()
    };
    if let Some(endpoint) = cli.narrative_endpoint {
        narrative_config.endpoint = endpoint;
    }

    let narrative = match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.is_empty() => {
            tracing::info!("narrative collaborator enabled");
            Some(NarrativeClient::new(&narrative_config, key)?)
        }
        _ => {
            tracing::info!("{API_KEY_VAR} not set; narrative collaborator disabled");
            None
        }
    };

    tokio::fs::create_dir_all(&cli.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", cli.upload_dir.display()))?;
    tokio::fs::create_dir_all(&cli.heatmap_dir)
        .await
        .with_context(|| format!("creating heatmap dir {}", cli.heatmap_dir.display()))?;

    let state = Arc::new(AppState {
        config,
        narrative,
        narrative_policy: narrative_config.policy,
        upload_dir: cli.upload_dir,
        heatmap_dir: cli.heatmap_dir,
    });

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("binding {}", cli.bind))?;
    tracing::info!(addr = %cli.bind, "listening");
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
