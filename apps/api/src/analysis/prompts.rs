// Prompt constants for resume analysis.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(job_description|resume_text)\}").expect("valid regex"));

/// System prompt for resume analysis — enforces JSON-only output.
pub const ANALYSIS_SYSTEM: &str = "You are an expert resume analyzer and career counselor. \
    Analyze resumes against job descriptions and provide detailed, actionable feedback. \
    You MUST respond with valid JSON only.";

/// Analysis prompt template. Replace `{job_description}` and `{resume_text}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume against the job description.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

Return a JSON object with this EXACT schema (no extra fields):
{
  "overallScore": <number 0-100>,
  "categoryScores": {
    "skills": <number 0-100>,
    "experience": <number 0-100>,
    "education": <number 0-100>,
    "keywords": <number 0-100>,
    "formatting": <number 0-100>
  },
  "strengths": ["<strength>", ...],
  "weaknesses": ["<weakness>", ...],
  "suggestions": ["<actionable suggestion>", ...],
  "keywordMatch": {
    "matched": ["<keyword found in resume>", ...],
    "missing": ["<important keyword missing from resume>", ...],
    "matchPercentage": <number 0-100>
  },
  "summary": "<2-3 sentence overall assessment>"
}"#;

/// Fills both placeholders in one pass; inserted text is never rescanned.
pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    PLACEHOLDER
        .replace_all(ANALYSIS_PROMPT_TEMPLATE, |caps: &Captures<'_>| match &caps[1] {
            "job_description" => job_description.to_string(),
            _ => resume_text.to_string(),
        })
        .into_owned()
}
