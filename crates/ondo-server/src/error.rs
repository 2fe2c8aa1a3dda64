//! Boundary translation from component errors to HTTP responses.
//!
//! Every handler returns `Result<_, ApiError>`; this is the single
//! place that decides status codes and error bodies. Component crates
//! know nothing about HTTP.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ondo_narrative::NarrativeError;
use ondo_pipeline::PipelineError;
use ondo_render::RenderError;
use serde_json::json;

/// Request-boundary error for both endpoints.
#[derive(Debug)]
pub enum ApiError {
    /// `/analyze` multipart had no `file` field.
    NoFileUploaded,
    /// `/analyze` file field carried an empty filename.
    NoFileSelected,
    /// `/generateHeatmap` multipart had no `image` field.
    NoImageProvided,
    /// `/generateHeatmap` image field carried an empty filename.
    NoImageSelected,
    /// The multipart stream itself was malformed.
    Multipart(MultipartError),
    /// The heatmap input could not be decoded.
    HeatmapUnreadable,
    /// Decode or processing fault in the analysis pipeline.
    Pipeline(PipelineError),
    /// Heatmap encoding fault.
    Render(RenderError),
    /// The narrative collaborator failed under the propagate policy.
    Collaborator(NarrativeError),
    /// Filesystem fault while spooling or persisting artifacts.
    Io(std::io::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NoFileUploaded
            | Self::NoFileSelected
            | Self::NoImageProvided
            | Self::NoImageSelected
            | Self::Multipart(_)
            | Self::HeatmapUnreadable => StatusCode::BAD_REQUEST,
            Self::Pipeline(_) | Self::Render(_) | Self::Collaborator(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::NoFileUploaded => json!({"error": "No file uploaded"}),
            Self::NoFileSelected => json!({"error": "No file selected"}),
            Self::NoImageProvided => json!({"error": "No image file provided."}),
            Self::NoImageSelected => json!({"error": "No selected file."}),
            Self::Multipart(e) => json!({"error": format!("Malformed upload: {e}")}),
            Self::HeatmapUnreadable => json!({
                "error": "Unable to read the image. Make sure it's a valid thermal image."
            }),
            Self::Pipeline(e) => json!({
                "error": "Internal server error",
                "details": e.to_string(),
            }),
            Self::Render(e) => json!({
                "error": "Internal server error",
                "details": e.to_string(),
            }),
            Self::Collaborator(e) => json!({
                "error": "Internal server error",
                "details": e.to_string(),
            }),
            Self::Io(e) => json!({
                "error": "Internal server error",
                "details": e.to_string(),
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(error = ?self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self::Multipart(error)
    }
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        Self::Pipeline(error)
    }
}

impl From<RenderError> for ApiError {
    fn from(error: RenderError) -> Self {
        // A heatmap input that fails to decode is a client fault; only
        // encoder failures are server faults.
        match error {
            RenderError::EmptyInput | RenderError::ImageDecode(_) => Self::HeatmapUnreadable,
            RenderError::JpegEncode(_) => Self::Render(error),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
