//! Shared, read-only application state.

use std::path::PathBuf;

use ondo_narrative::{FailurePolicy, NarrativeClient};
use ondo_pipeline::AnalysisConfig;

/// State shared by every request handler.
///
/// Built once at startup and never mutated afterwards, so it is shared
/// behind an `Arc` with no locking. Per-request artifacts (grids,
/// regions, reports) are owned by the handling task and dropped with
/// it.
pub struct AppState {
    /// Analysis configuration, including thresholds and the
    /// implication table.
    pub config: AnalysisConfig,
    /// Narrative collaborator client; `None` when no API key was
    /// configured, which disables the narrative entirely.
    pub narrative: Option<NarrativeClient>,
    /// What a collaborator failure means for the request.
    pub narrative_policy: FailurePolicy,
    /// Directory uploads are spooled into.
    pub upload_dir: PathBuf,
    /// Directory rendered heatmaps are persisted into.
    pub heatmap_dir: PathBuf,
}
