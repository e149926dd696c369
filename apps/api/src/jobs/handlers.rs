//! Axum route handlers for the Job extraction API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::jobs::extractor::{extract, ExtractedJobPosting};
use crate::jobs::fetch::parse_job_url;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractJobRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractJobResponse {
    pub success: bool,
    /// Labeled text ready to paste into an analysis request.
    pub job_description: String,
    pub job: ExtractedJobPosting,
    pub source_url: String,
    pub extracted_at: DateTime<Utc>,
}

/// POST /api/extract-job
///
/// Fetches a job listing (`*/companies/<company>/jobs/<job>`) and extracts its description.
pub async fn handle_extract_job(
    State(state): State<AppState>,
    Json(request): Json<ExtractJobRequest>,
) -> Result<Json<ExtractJobResponse>, AppError> {
    let url = parse_job_url(&request.url).ok_or_else(|| {
        AppError::Validation(
            "Please provide a valid job URL of the form https://<site>/companies/<company>/jobs/<job>"
                .to_string(),
        )
    })?;

    let html = state.fetcher.fetch(&url).await?;
    let job = extract(&html)?;

    info!(%url, title = %job.title, company = %job.company, "job description extracted");

    Ok(Json(ExtractJobResponse {
        success: true,
        job_description: job.to_job_description(),
        job,
        source_url: url.to_string(),
        extracted_at: Utc::now(),
    }))
}
