//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analysis::models::ResumeAnalysis;
use crate::analysis::resume_text::{detect_format, extract_resume_text};
use crate::errors::AppError;
use crate::state::AppState;
use crate::stats::AnalysisEvent;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// Multipart form fields of an analysis request.
#[derive(Default)]
struct AnalyzeForm {
    resume: Option<UploadedFile>,
    job_description: Option<String>,
    user_id: Option<String>,
    job_title: Option<String>,
    user_name: Option<String>,
    user_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub original_name: String,
    pub file_size: usize,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: ResumeAnalysis,
    pub metadata: AnalysisMetadata,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analyze-resume
///
/// Multipart: `resume` file plus `jobDescription`, `userId`, `userName`, `userEmail`
/// and optional `jobTitle`. Extracts the resume text, runs the analyzer and records the
/// result in the usage stats.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = read_form(multipart).await?;

    let resume = form.resume.ok_or_else(|| {
        AppError::Validation(
            "No resume file uploaded. Please upload a PDF, DOCX or plain-text file".to_string(),
        )
    })?;
    let job_description = required(form.job_description, "Job description is required")?;
    let user_id = required(form.user_id, "User ID is required")?;
    let (user_name, user_email) = match (form.user_name, form.user_email) {
        (Some(name), Some(email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
            (name, email)
        }
        _ => {
            return Err(AppError::Validation(
                "User information is required: provide userName and userEmail".to_string(),
            ))
        }
    };

    let format = detect_format(&resume.file_name, resume.content_type.as_deref())?;
    let file_size = resume.data.len();
    let resume_text =
        extract_resume_text(resume.data, format, state.config.max_upload_bytes).await?;

    let analysis = state
        .analyzer
        .analyze(&resume_text, &job_description)
        .await?;

    let now = Utc::now();
    state
        .stats
        .record(
            AnalysisEvent {
                user_id,
                user_name,
                user_email,
                job_title: form.job_title,
                file_name: resume.file_name.clone(),
                file_size,
                analysis: analysis.clone(),
            },
            now,
        )
        .await;

    info!(
        file = %resume.file_name,
        file_size,
        overall_score = analysis.overall_score,
        "resume analyzed"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
        metadata: AnalysisMetadata {
            original_name: resume.file_name,
            file_size,
            analyzed_at: now,
        },
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                form.resume = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "jobDescription" => form.job_description = Some(field.text().await?),
            "userId" => form.user_id = Some(field.text().await?),
            "jobTitle" => form.job_title = Some(field.text().await?),
            "userName" => form.user_name = Some(field.text().await?),
            "userEmail" => form.user_email = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}
