use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-analyzer-api"
    }))
}

/// GET /
/// Service banner listing the public endpoints.
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "AI Resume Analyzer API",
        "status": "Running",
        "endpoints": {
            "analyze": "POST /api/analyze-resume",
            "extractJob": "POST /api/extract-job",
            "adminLogin": "POST /admin/login",
            "adminStats": "GET /admin/stats"
        }
    }))
}
