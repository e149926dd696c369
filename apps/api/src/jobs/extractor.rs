//! Job Posting Extractor — pulls a job description and its metadata out of a job-listing page.
//!
//! Extraction runs four ordered passes over the page. Each pass only fills fields that are
//! still empty, so a value found by an earlier (more structured) pass always wins:
//!
//! 1. JSON-LD `JobPosting` structured data
//! 2. `<meta name="description">`
//! 3. `<title>` ("<role> at <company> | Y Combinator")
//! 4. free-text patterns for salary, experience and location
//!
//! The description is the only required field. The extractor is pure: no I/O, no shared state.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::jobs::normalize::normalize_description;

/// Site suffixes stripped from the `<title>` before splitting it.
const TITLE_SUFFIXES: &[&str] = &[" | Y Combinator", " | Work at a Startup"];

const LOCATION_SEPARATOR: &str = " / ";

static SALARY_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[$€£]\s?\d[\d,.]*\s?[kK]?\s*[-–]\s*[$€£]?\s?\d[\d,.]*\s?[kK]?")
        .expect("valid regex")
});
static EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\+\s*years?\b|\b\d+\s*-\s*\d+\s*years?\b|\bany\s*\(new grads ok\)")
        .expect("valid regex")
});
static LOCATIONS: LazyLock<Regex> = LazyLock::new(|| {
    let place = r"[A-Z][A-Za-z.]*(?: [A-Z][A-Za-z.]*)*, [A-Z]{2}, [A-Z]{2,3}\b";
    Regex::new(&format!(r"{place}(?:\s*/\s*{place})*")).expect("valid regex")
});

/// Everything extracted from a job-listing page.
///
/// All fields except `description` are best-effort and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedJobPosting {
    pub title: String,
    pub company: String,
    pub employment_type: String,
    pub experience: String,
    pub location: String,
    pub salary: String,
    /// Normalized, Markdown-ish description body.
    pub description: String,
}

impl ExtractedJobPosting {
    /// Assembles the labeled text handed to the analyzer: one block per known field,
    /// then the description.
    pub fn to_job_description(&self) -> String {
        let labeled = [
            ("Job Title", &self.title),
            ("Company", &self.company),
            ("Job Type", &self.employment_type),
            ("Experience Required", &self.experience),
            ("Location", &self.location),
            ("Salary", &self.salary),
        ];

        let mut text = String::new();
        for (label, value) in labeled {
            if !value.is_empty() {
                text.push_str(&format!("{label}: {value}\n\n"));
            }
        }
        text.push_str("Job Description:\n");
        text.push_str(&self.description);
        text
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// No pass produced a description. Callers should suggest copying it manually.
    #[error("Job description not found on page")]
    DescriptionNotFound,
}

/// A fetched page: the raw markup for pattern searches and the parsed tree for selectors.
struct Page<'a> {
    raw: &'a str,
    document: Html,
}

type Pass = fn(&Page<'_>, &mut ExtractedJobPosting);

const PASSES: &[(&str, Pass)] = &[
    ("structured_data", structured_data_pass),
    ("meta_description", meta_description_pass),
    ("title", title_pass),
    ("free_text", free_text_pass),
];

/// Extracts a job posting from raw page HTML.
///
/// Fails only when no description could be found by any pass.
pub fn extract(html: &str) -> Result<ExtractedJobPosting, ExtractionError> {
    let posting = run_passes(html);
    if posting.description.is_empty() {
        return Err(ExtractionError::DescriptionNotFound);
    }
    Ok(posting)
}

fn run_passes(html: &str) -> ExtractedJobPosting {
    let page = Page {
        raw: html,
        document: Html::parse_document(html),
    };
    let mut posting = ExtractedJobPosting::default();

    for (name, pass) in PASSES {
        pass(&page, &mut posting);
        debug!(
            pass = name,
            has_description = !posting.description.is_empty(),
            "extraction pass complete"
        );
    }

    posting
}

/// Sets `field` to the trimmed `value` unless the field is already filled or the value is blank.
fn fill_if_empty(field: &mut String, value: &str) {
    let value = value.trim();
    if field.is_empty() && !value.is_empty() {
        *field = value.to_string();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 1: JSON-LD structured data
// ────────────────────────────────────────────────────────────────────────────

fn structured_data_pass(page: &Page<'_>, posting: &mut ExtractedJobPosting) {
    let Some(job) = find_job_posting_block(&page.document) else {
        return;
    };

    if let Some(title) = job.get("title").and_then(text_of) {
        fill_if_empty(&mut posting.title, title);
    }
    if let Some(company) = job.get("hiringOrganization").and_then(text_of) {
        fill_if_empty(&mut posting.company, company);
    }
    fill_if_empty(&mut posting.location, &job_locations(&job));
    if let Some(description) = job.get("description").and_then(Value::as_str) {
        fill_if_empty(&mut posting.description, &normalize_description(description));
    }
    if let Some(employment_type) = job.get("employmentType") {
        fill_if_empty(&mut posting.employment_type, &join_strings(employment_type, ", "));
    }
    if let Some(base_salary) = job.get("baseSalary") {
        fill_if_empty(&mut posting.salary, &format_salary(base_salary));
    }
}

/// Returns the first `JobPosting` object across all JSON-LD blocks.
/// Blocks that fail to parse are skipped.
fn find_job_posting_block(document: &Html) -> Option<Value> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;

    document
        .select(&selector)
        .filter_map(|script| {
            let raw: String = script.text().collect();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!(error = %e, "skipping malformed JSON-LD block");
                    None
                }
            }
        })
        .find_map(job_posting_in)
}

/// Looks for a `JobPosting` in a parsed block: the object itself, a top-level array, or `@graph`.
fn job_posting_in(value: Value) -> Option<Value> {
    match value {
        Value::Array(items) => items.into_iter().find_map(job_posting_in),
        Value::Object(mut object) => {
            if let Some(Value::Array(graph)) = object.remove("@graph") {
                return graph.into_iter().find_map(job_posting_in);
            }
            let value = Value::Object(object);
            is_job_posting(&value).then_some(value)
        }
        _ => None,
    }
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "JobPosting",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("JobPosting")),
        _ => false,
    }
}

/// A schema.org value that is either a plain string or an object with a `name`.
fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(_) => value.get("name").and_then(Value::as_str),
        _ => None,
    }
}

fn join_strings(value: &Value, separator: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(separator),
        _ => String::new(),
    }
}

fn job_locations(job: &Value) -> String {
    let places: Vec<&Value> = match job.get("jobLocation") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(place) => vec![place],
        None => Vec::new(),
    };

    let locations: Vec<String> = places.into_iter().filter_map(format_place).collect();
    if !locations.is_empty() {
        return locations.join(LOCATION_SEPARATOR);
    }

    match job.get("jobLocationType").and_then(Value::as_str) {
        Some("TELECOMMUTE") => "Remote".to_string(),
        _ => String::new(),
    }
}

fn format_place(place: &Value) -> Option<String> {
    let address = place.get("address").unwrap_or(place);
    if let Some(text) = address.as_str() {
        let text = text.trim();
        return (!text.is_empty()).then(|| text.to_string());
    }

    let parts: Vec<&str> = ["addressLocality", "addressRegion", "addressCountry"]
        .iter()
        .filter_map(|key| address.get(*key).and_then(text_of))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Formats `baseSalary` as `"USD $110K - $160K"`. Missing sides and currency are omitted.
fn format_salary(base_salary: &Value) -> String {
    let currency = base_salary
        .get("currency")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    let value = base_salary.get("value");
    let single = value.and_then(|v| number_of(v).or_else(|| v.get("value").and_then(number_of)));
    let min = value.and_then(|v| v.get("minValue")).and_then(number_of).or(single);
    let max = value.and_then(|v| v.get("maxValue")).and_then(number_of);

    let range = match (min, max) {
        (Some(min), Some(max)) => format!("${}K - ${}K", thousands(min), thousands(max)),
        (Some(only), None) | (None, Some(only)) => format!("${}K", thousands(only)),
        (None, None) => return String::new(),
    };

    if currency.is_empty() {
        range
    } else {
        format!("{currency} {range}")
    }
}

fn number_of(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn thousands(amount: f64) -> String {
    let k = amount / 1000.0;
    if k.fract() == 0.0 {
        format!("{}", k as i64)
    } else {
        format!("{k}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 2: meta description
// ────────────────────────────────────────────────────────────────────────────

fn meta_description_pass(page: &Page<'_>, posting: &mut ExtractedJobPosting) {
    if !posting.description.is_empty() {
        return;
    }
    let Ok(selector) = Selector::parse(r#"meta[name="description"]"#) else {
        return;
    };

    if let Some(content) = page
        .document
        .select(&selector)
        .find_map(|meta| meta.value().attr("content"))
    {
        fill_if_empty(&mut posting.description, &normalize_description(content));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 3: document title
// ────────────────────────────────────────────────────────────────────────────

fn title_pass(page: &Page<'_>, posting: &mut ExtractedJobPosting) {
    if !posting.title.is_empty() {
        return;
    }
    let Ok(selector) = Selector::parse("title") else {
        return;
    };
    let Some(element) = page.document.select(&selector).next() else {
        return;
    };

    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let text = strip_site_suffix(&text);

    match text.split_once(" at ") {
        Some((role, company)) if !role.trim().is_empty() && !company.trim().is_empty() => {
            fill_if_empty(&mut posting.title, role);
            fill_if_empty(&mut posting.company, company);
        }
        _ => fill_if_empty(&mut posting.title, text),
    }
}

fn strip_site_suffix(title: &str) -> &str {
    TITLE_SUFFIXES
        .iter()
        .find_map(|suffix| title.strip_suffix(suffix))
        .unwrap_or(title)
        .trim()
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 4: free-text heuristics
// ────────────────────────────────────────────────────────────────────────────

fn free_text_pass(page: &Page<'_>, posting: &mut ExtractedJobPosting) {
    if posting.salary.is_empty() {
        if let Some(found) = SALARY_RANGE.find(page.raw) {
            fill_if_empty(&mut posting.salary, found.as_str());
        }
    }

    if posting.experience.is_empty() {
        if let Some(found) = EXPERIENCE.find(page.raw) {
            fill_if_empty(&mut posting.experience, found.as_str());
        }
    }

    if posting.location.is_empty() {
        if let Some(found) = LOCATIONS.find(page.raw) {
            let joined = found
                .as_str()
                .split('/')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(LOCATION_SEPARATOR);
            fill_if_empty(&mut posting.location, &joined);
        }
    }
}
