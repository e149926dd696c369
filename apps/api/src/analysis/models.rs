//! The resume-vs-job scoring report.
//!
//! Field names are camelCase on the wire; the frontend and the admin dashboard read them as-is.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Per-category scores, each 0 – 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub keywords: f64,
    pub formatting: f64,
}

impl CategoryScores {
    /// `(name, score)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("skills", self.skills),
            ("experience", self.experience),
            ("education", self.education),
            ("keywords", self.keywords),
            ("formatting", self.formatting),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMatch {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub match_percentage: f64,
}

/// Full analysis returned by the analyzer and stored in the usage stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    pub overall_score: f64,
    pub category_scores: CategoryScores,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub keyword_match: KeywordMatch,
    pub summary: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidAnalysis {
    #[error("Overall score must be between 0 and 100, got {0}")]
    OverallScore(f64),

    #[error("Invalid {category} score: must be between 0 and 100, got {score}")]
    CategoryScore { category: &'static str, score: f64 },

    #[error("Keyword match percentage must be between 0 and 100, got {0}")]
    MatchPercentage(f64),
}

impl ResumeAnalysis {
    /// Checks score ranges. Structural checks (required fields, array shapes) are
    /// enforced by deserialization.
    pub fn validate(&self) -> Result<(), InvalidAnalysis> {
        if !SCORE_RANGE.contains(&self.overall_score) {
            return Err(InvalidAnalysis::OverallScore(self.overall_score));
        }

        for (category, score) in self.category_scores.entries() {
            if !SCORE_RANGE.contains(&score) {
                return Err(InvalidAnalysis::CategoryScore { category, score });
            }
        }

        if !SCORE_RANGE.contains(&self.keyword_match.match_percentage) {
            return Err(InvalidAnalysis::MatchPercentage(
                self.keyword_match.match_percentage,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn analysis(overall: f64, weaknesses: &[&str]) -> ResumeAnalysis {
        ResumeAnalysis {
            overall_score: overall,
            category_scores: CategoryScores {
                skills: overall,
                experience: overall,
                education: overall,
                keywords: overall,
                formatting: overall,
            },
            strengths: vec!["Clear structure".to_string()],
            weaknesses: weaknesses.iter().map(|w| w.to_string()).collect(),
            suggestions: vec!["Quantify impact".to_string()],
            keyword_match: KeywordMatch {
                matched: vec!["Rust".to_string()],
                missing: vec!["Kubernetes".to_string()],
                match_percentage: 50.0,
            },
            summary: "Solid fit.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LLM_OUTPUT: &str = r#"{
        "overallScore": 78,
        "categoryScores": {"skills": 80, "experience": 75, "education": 90, "keywords": 60, "formatting": 85},
        "strengths": ["Strong Rust background", "Open-source work"],
        "weaknesses": ["No cloud experience"],
        "suggestions": ["Add metrics to bullets"],
        "keywordMatch": {"matched": ["Rust", "Tokio"], "missing": ["AWS"], "matchPercentage": 66.7},
        "summary": "Good fit with some gaps."
    }"#;

    #[test]
    fn test_deserializes_camel_case_report() {
        let analysis: ResumeAnalysis = serde_json::from_str(LLM_OUTPUT).unwrap();
        assert_eq!(analysis.overall_score, 78.0);
        assert_eq!(analysis.category_scores.education, 90.0);
        assert_eq!(analysis.keyword_match.missing, vec!["AWS"]);
        assert!(analysis.validate().is_ok());
    }

    #[test]
    fn test_missing_field_fails_to_deserialize() {
        let json = r#"{"overallScore": 50, "strengths": [], "weaknesses": [], "suggestions": [], "summary": ""}"#;
        assert!(serde_json::from_str::<ResumeAnalysis>(json).is_err());
    }

    #[test]
    fn test_non_array_strengths_fail_to_deserialize() {
        let json = LLM_OUTPUT.replace(r#"["Strong Rust background", "Open-source work"]"#, r#""lots""#);
        assert!(serde_json::from_str::<ResumeAnalysis>(&json).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_overall_score() {
        let analysis = fixtures::analysis(101.0, &[]);
        assert_eq!(analysis.validate(), Err(InvalidAnalysis::OverallScore(101.0)));
    }

    #[test]
    fn test_rejects_out_of_range_category_score() {
        let mut analysis = fixtures::analysis(70.0, &[]);
        analysis.category_scores.keywords = -1.0;
        assert_eq!(
            analysis.validate(),
            Err(InvalidAnalysis::CategoryScore {
                category: "keywords",
                score: -1.0
            })
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(fixtures::analysis(70.0, &[])).unwrap();
        assert!(value.get("overallScore").is_some());
        assert!(value["keywordMatch"].get("matchPercentage").is_some());
    }
}
