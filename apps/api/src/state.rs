use std::sync::Arc;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::config::Config;
use crate::jobs::fetch::JobPageFetcher;
use crate::stats::StatsStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable analyzer. Default: LlmResumeAnalyzer.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub fetcher: JobPageFetcher,
    /// Process-lifetime usage statistics for the admin dashboard.
    pub stats: Arc<StatsStore>,
}
