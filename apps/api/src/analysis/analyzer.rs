//! Resume Analyzer — pluggable, trait-based scorer of a resume against a job description.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`. The default backend is `LlmResumeAnalyzer`;
//! tests swap in a canned implementation.

use async_trait::async_trait;
use tracing::info;

use crate::analysis::models::ResumeAnalysis;
use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;

/// Scores resume text against a job description.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<ResumeAnalysis, AppError>;
}

/// Analyzer backed by the chat-completions LLM.
pub struct LlmResumeAnalyzer(pub LlmClient);

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<ResumeAnalysis, AppError> {
        let prompt = build_analysis_prompt(resume_text, job_description);
        let system = format!("{ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM}");

        let analysis: ResumeAnalysis = self
            .0
            .call_json(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

        analysis
            .validate()
            .map_err(|e| AppError::Llm(format!("Invalid response format from AI analysis: {e}")))?;

        info!(
            overall_score = analysis.overall_score,
            "resume analysis completed"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Returns the same analysis for every call.
    pub struct CannedAnalyzer(pub ResumeAnalysis);

    #[async_trait]
    impl ResumeAnalyzer for CannedAnalyzer {
        async fn analyze(
            &self,
            _resume_text: &str,
            _job_description: &str,
        ) -> Result<ResumeAnalysis, AppError> {
            Ok(self.0.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::CannedAnalyzer;
    use super::*;
    use crate::analysis::models::fixtures;

    #[tokio::test]
    async fn test_canned_analyzer_through_trait_object() {
        let analyzer: Box<dyn ResumeAnalyzer> = Box::new(CannedAnalyzer(fixtures::analysis(
            64.0,
            &["Missing cloud skills"],
        )));
        let analysis = analyzer.analyze("resume", "job").await.unwrap();
        assert_eq!(analysis.overall_score, 64.0);
    }

    #[test]
    fn test_prompt_contains_both_inputs() {
        let prompt = build_analysis_prompt("RESUME BODY", "JOB BODY");
        assert!(prompt.contains("RESUME BODY"));
        assert!(prompt.contains("JOB BODY"));
        assert!(!prompt.contains("{resume_text}"));
    }
}
