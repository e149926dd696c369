pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::stats::handlers as admin;

/// Room for the multipart framing and text fields on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(health::index_handler))
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/analyze-resume", post(analysis::handle_analyze_resume))
        .route("/api/extract-job", post(jobs::handle_extract_job))
        // Admin API
        .route("/admin/login", post(admin::handle_admin_login))
        .route("/admin/stats", get(admin::handle_admin_stats))
        .route("/admin/stats-simple", get(admin::handle_admin_stats_simple))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
