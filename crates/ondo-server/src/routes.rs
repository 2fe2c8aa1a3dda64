//! HTTP routes for the analysis and heatmap endpoints.
//!
//! Handlers are thin: parse the multipart form, spool the upload under
//! a cleanup guard, call into the pure crates, translate errors at the
//! boundary. All decision logic lives in `ondo-pipeline`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use ondo_narrative::{FailurePolicy, build_prompt};
use ondo_pipeline::AnalysisReport;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;
use crate::upload::UploadGuard;

/// Largest accepted upload, in bytes.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/generateHeatmap", post(generate_heatmap))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One parsed file field: client filename and content.
struct FilePart {
    filename: String,
    bytes: Vec<u8>,
}

/// Collected `/analyze` form fields.
#[derive(Default)]
struct AnalyzeForm {
    file: Option<FilePart>,
    body_part: Option<String>,
}

impl AnalyzeForm {
    /// Drain the multipart stream. Unknown fields (the upload form
    /// also carries patient contact details) are ignored.
    async fn parse(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            match field.name() {
                Some("file") => {
                    let filename = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await?.to_vec();
                    form.file = Some(FilePart { filename, bytes });
                }
                Some("bodyPart") => {
                    form.body_part = Some(field.text().await?);
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

/// `POST /analyze`: classify one thermal image.
async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, ApiError> {
    let form = AnalyzeForm::parse(multipart).await?;
    let file = form.file.ok_or(ApiError::NoFileUploaded)?;
    if file.filename.is_empty() {
        return Err(ApiError::NoFileSelected);
    }
    let body_part = form.body_part.unwrap_or_else(|| "default".to_owned());

    // Spool under a guard so the file is removed on every exit path,
    // including the error returns below.
    let upload = UploadGuard::spool(&state.upload_dir, &file.filename, &file.bytes).await?;
    tracing::debug!(path = %upload.path().display(), %body_part, "analyzing upload");

    let mut report = ondo_pipeline::analyze(&file.bytes, &body_part, &state.config)?;

    if let Some(client) = &state.narrative {
        let prompt = build_prompt(&body_part, &report.condition, &report.implications);
        match client.elaborate(&prompt).await {
            Ok(text) => report.narrative = Some(text),
            Err(error) => match state.narrative_policy {
                FailurePolicy::Degrade => {
                    tracing::warn!(%error, "narrative degraded, returning numeric report");
                    report
                        .warnings
                        .push("narrative generation unavailable".to_owned());
                }
                FailurePolicy::Propagate => return Err(ApiError::Collaborator(error)),
            },
        }
    }

    tracing::info!(
        num_regions = report.num_regions,
        condition = %report.condition,
        "analysis complete"
    );
    Ok(Json(report))
}

/// `POST /generateHeatmap`: render a false-color heatmap.
async fn generate_heatmap(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut image: Option<FilePart> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or_default().to_owned();
            let bytes = field.bytes().await?.to_vec();
            image = Some(FilePart { filename, bytes });
        }
    }
    let image = image.ok_or(ApiError::NoImageProvided)?;
    if image.filename.is_empty() {
        return Err(ApiError::NoImageSelected);
    }

    let upload = UploadGuard::spool(&state.upload_dir, &image.filename, &image.bytes).await?;
    let jpeg = ondo_render::heatmap_jpeg(&image.bytes)?;

    // Persist the rendered heatmap alongside the response stream.
    let stem = upload
        .path()
        .file_stem()
        .map_or_else(|| "upload".to_owned(), |s| s.to_string_lossy().into_owned());
    let output_path = state.heatmap_dir.join(format!("{stem}_heatmap.jpg"));
    tokio::fs::write(&output_path, &jpeg).await?;
    tracing::info!(path = %output_path.display(), "heatmap rendered");

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response())
}
