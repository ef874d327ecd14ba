//! Request handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info, warn};

use findoc_engine::{AnalysisEngine, EngineError};
use findoc_traits::AnalysisId;

/// Multipart field carrying the statement.
pub const UPLOAD_FIELD: &str = "file";

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Application state.
pub struct AppState {
    /// The analysis engine
    pub engine: Arc<AnalysisEngine>,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Error response.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: details.into(),
        }
    }
}

fn error_response(status: StatusCode, message: &str, details: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message, details))).into_response()
}

fn retention_details(minutes: u64) -> String {
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    format!(
        "The analysis does not exist or has expired (results are kept for {} {})",
        minutes, unit
    )
}

fn not_found(state: &AppState) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "Analysis not found",
        retention_details(state.engine.config().retention_minutes()),
    )
}

/// Links to the sub-resources of an accepted analysis.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEndpoints {
    total: String,
    classification: String,
    stocks: String,
    fixed_income: String,
    complete: String,
}

impl AnalysisEndpoints {
    fn for_id(analysis_id: &AnalysisId) -> Self {
        let base = format!("/api/analysis/{}", analysis_id);
        Self {
            total: format!("{}/total", base),
            classification: format!("{}/classification", base),
            stocks: format!("{}/stocks", base),
            fixed_income: format!("{}/fixed-income", base),
            complete: format!("{}/complete", base),
        }
    }
}

/// Response to an accepted upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisAccepted {
    analysis_id: AnalysisId,
    message: String,
    endpoints: AnalysisEndpoints,
}

struct Upload {
    file_name: String,
    content_type: Option<String>,
    content: Bytes,
}

fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, Response> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            warn!("Unreadable multipart body: {}", e);
            error_response(
                StatusCode::BAD_REQUEST,
                "Invalid upload",
                format!("The request body could not be read: {}", e.body_text()),
            )
        })?;

        let Some(field) = field else {
            return Ok(None);
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("statement.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(|e| {
            warn!("Upload interrupted: {}", e);
            error_response(
                StatusCode::BAD_REQUEST,
                "Invalid upload",
                format!("The file could not be read: {}", e.body_text()),
            )
        })?;

        return Ok(Some(Upload {
            file_name,
            content_type,
            content,
        }));
    }
}

/// Accept a statement and run the analysis pipeline.
pub async fn upload_analysis(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) if !upload.content.is_empty() => upload,
        Ok(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "No file was uploaded",
                "Please send a valid PDF file",
            );
        }
        Err(response) => return response,
    };

    if upload.content.len() > state.max_upload_bytes {
        return error_response(
            StatusCode::BAD_REQUEST,
            "File too large",
            format!(
                "The maximum allowed size is {} MB",
                state.max_upload_bytes / 1024 / 1024
            ),
        );
    }

    if !is_pdf_content_type(upload.content_type.as_deref()) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid file type",
            "Only PDF files are accepted",
        );
    }

    info!(
        file = %upload.file_name,
        size = upload.content.len(),
        "Received statement upload"
    );

    match state
        .engine
        .orchestrator()
        .process_document(upload.content, &upload.file_name)
        .await
    {
        Ok(analysis_id) => (
            StatusCode::ACCEPTED,
            Json(AnalysisAccepted {
                analysis_id,
                message: "Analysis completed successfully".to_string(),
                endpoints: AnalysisEndpoints::for_id(&analysis_id),
            }),
        )
            .into_response(),
        Err(EngineError::Validation(details)) => {
            error_response(StatusCode::BAD_REQUEST, "Could not process file", details)
        }
        Err(e) => {
            error!(error = %e, "Statement analysis failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "An error occurred while processing your request. Please try again.",
            )
        }
    }
}

/// Malformed identifiers are reported exactly like unknown ones.
fn parse_id(raw: &str) -> Option<AnalysisId> {
    AnalysisId::parse_str(raw).ok().filter(|id| !id.is_nil())
}

/// Get the aggregate total.
pub async fn get_total(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found(&state);
    };
    match state.engine.orchestrator().get_total(&id).await {
        Some(total) => Json(total).into_response(),
        None => not_found(&state),
    }
}

/// Get the asset-class breakdown.
pub async fn get_classification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found(&state);
    };
    match state.engine.orchestrator().get_classification(&id).await {
        Some(classification) => Json(classification).into_response(),
        None => not_found(&state),
    }
}

/// Get the equity holdings.
pub async fn get_stocks(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found(&state);
    };
    match state.engine.orchestrator().get_stocks(&id).await {
        Some(stocks) => Json(stocks).into_response(),
        None => not_found(&state),
    }
}

/// Get the fixed-income holdings.
pub async fn get_fixed_income(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found(&state);
    };
    match state.engine.orchestrator().get_fixed_income(&id).await {
        Some(fixed_income) => Json(fixed_income).into_response(),
        None => not_found(&state),
    }
}

/// Get the complete result.
pub async fn get_complete(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found(&state);
    };
    match state.engine.orchestrator().get_analysis(&id).await {
        Some(result) => Json(result.as_ref().clone()).into_response(),
        None => not_found(&state),
    }
}

/// Discard a result before it expires.
pub async fn delete_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    if let Some(id) = parse_id(&id) {
        state.engine.orchestrator().discard_analysis(&id).await;
        info!(analysis_id = %id, "Analysis discarded");
    }
    StatusCode::NO_CONTENT
}
