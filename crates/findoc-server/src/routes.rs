//! Route definitions.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use findoc_engine::AnalysisEngine;

use crate::handlers::{self, AppState};

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the API router.
///
/// # Arguments
/// * `engine` - The analysis engine
/// * `max_upload_bytes` - Largest accepted statement
pub fn create_router(engine: Arc<AnalysisEngine>, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState {
        engine,
        max_upload_bytes,
    });

    Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Upload
        .route(
            "/api/analysis",
            post(handlers::upload_analysis)
                .layer::<_, Infallible>(DefaultBodyLimit::disable())
                .layer::<_, Infallible>(RequestBodyLimitLayer::new(
                    max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
                )),
        )
        // Results
        .route("/api/analysis/:id", delete(handlers::delete_analysis))
        .route("/api/analysis/:id/total", get(handlers::get_total))
        .route("/api/analysis/:id/classification", get(handlers::get_classification))
        .route("/api/analysis/:id/stocks", get(handlers::get_stocks))
        .route("/api/analysis/:id/fixed-income", get(handlers::get_fixed_income))
        .route("/api/analysis/:id/complete", get(handlers::get_complete))
        // State
        .with_state(state)
}
