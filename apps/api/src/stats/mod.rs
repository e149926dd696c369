//! In-memory usage statistics across all analyses served by this process.
//!
//! Nothing is persisted; a restart clears everything. One `RwLock` guards the whole store and
//! writers hold it only for the in-memory update.

pub mod handlers;

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::analysis::models::{CategoryScores, ResumeAnalysis};

const REPORT_DAYS: u64 = 7;
const TOP_WEAKNESSES: usize = 5;
const RECENT_ANALYSES: usize = 10;
const UNSPECIFIED_JOB_TITLE: &str = "Not specified";

/// One completed analysis, as reported by the analysis handler.
#[derive(Debug, Clone)]
pub struct AnalysisEvent {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub job_title: Option<String>,
    pub file_name: String,
    pub file_size: usize,
    pub analysis: ResumeAnalysis,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub first_name: String,
    pub email: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub analysis_count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub analysis: ResumeAnalysis,
    pub analyzed_at: DateTime<Utc>,
    pub job_title: String,
    pub file_name: String,
    pub file_size: usize,
}

#[derive(Debug, Default)]
struct DailyRecord {
    analyses: u32,
    unique_users: HashSet<String>,
}

/// Users are keyed by email and kept in first-seen order.
#[derive(Debug, Default)]
struct UsageStats {
    users: Vec<UserRecord>,
    user_index: HashMap<String, usize>,
    performances: Vec<PerformanceRecord>,
    daily: BTreeMap<NaiveDate, DailyRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Report types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_users: usize,
    pub total_analyses: usize,
    pub average_score: f64,
    pub last_7_days_analyses: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAnalytics {
    pub date: String,
    pub analyses: u32,
    pub unique_users: usize,
}

#[derive(Debug, Serialize)]
pub struct WeaknessCount {
    pub weakness: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAnalysis {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub score: f64,
    pub analyzed_at: DateTime<Utc>,
    pub job_title: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    /// The email; kept under this name for the dashboard.
    pub user_id: String,
    pub first_name: String,
    pub email: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub analysis_count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsReport {
    pub summary: StatsSummary,
    pub daily_analytics: Vec<DailyAnalytics>,
    pub category_averages: CategoryScores,
    pub top_weaknesses: Vec<WeaknessCount>,
    pub recent_analyses: Vec<RecentAnalysis>,
    pub user_details: Vec<UserDetail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleStats {
    pub user_count: usize,
    pub performances: Vec<PerformanceRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct StatsStore {
    inner: RwLock<UsageStats>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one analysis at `now`.
    pub async fn record(&self, event: AnalysisEvent, now: DateTime<Utc>) {
        let mut stats = self.inner.write().await;
        let key = event.user_email.clone();

        match stats.user_index.get(&key).copied() {
            Some(idx) => {
                let user = &mut stats.users[idx];
                user.last_seen = now;
                user.analysis_count += 1;
                user.first_name = event.user_name.clone();
                user.email = event.user_email.clone();
            }
            None => {
                let idx = stats.users.len();
                stats.users.push(UserRecord {
                    first_name: event.user_name.clone(),
                    email: event.user_email.clone(),
                    first_seen: now,
                    last_seen: now,
                    analysis_count: 1,
                });
                stats.user_index.insert(key.clone(), idx);
            }
        }

        let day = stats.daily.entry(now.date_naive()).or_default();
        day.analyses += 1;
        day.unique_users.insert(key);

        stats.performances.push(PerformanceRecord {
            user_id: event.user_id,
            user_name: event.user_name,
            user_email: event.user_email,
            analysis: event.analysis,
            analyzed_at: now,
            job_title: event
                .job_title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNSPECIFIED_JOB_TITLE.to_string()),
            file_name: event.file_name,
            file_size: event.file_size,
        });
    }

    /// Builds the admin dashboard report with the 7-day window ending on `today`.
    pub async fn report(&self, today: NaiveDate) -> AdminStatsReport {
        let stats = self.inner.read().await;

        let daily_analytics = daily_window(&stats.daily, today);
        let last_7_days_analyses = daily_analytics.iter().map(|d| d.analyses).sum();

        AdminStatsReport {
            summary: StatsSummary {
                total_users: stats.users.len(),
                total_analyses: stats.performances.len(),
                average_score: round2(average_score(&stats.performances)),
                last_7_days_analyses,
            },
            daily_analytics,
            category_averages: category_averages(&stats.performances),
            top_weaknesses: top_weaknesses(&stats.performances),
            recent_analyses: stats
                .performances
                .iter()
                .rev()
                .take(RECENT_ANALYSES)
                .map(|p| RecentAnalysis {
                    user_id: p.user_id.clone(),
                    user_name: p.user_name.clone(),
                    user_email: p.user_email.clone(),
                    score: p.analysis.overall_score,
                    analyzed_at: p.analyzed_at,
                    job_title: p.job_title.clone(),
                    file_name: p.file_name.clone(),
                })
                .collect(),
            user_details: stats
                .users
                .iter()
                .map(|u| UserDetail {
                    user_id: u.email.clone(),
                    first_name: u.first_name.clone(),
                    email: u.email.clone(),
                    first_seen: u.first_seen,
                    last_seen: u.last_seen,
                    analysis_count: u.analysis_count,
                })
                .collect(),
        }
    }

    /// User count plus every raw performance record.
    pub async fn simple(&self) -> SimpleStats {
        let stats = self.inner.read().await;
        SimpleStats {
            user_count: stats.users.len(),
            performances: stats.performances.clone(),
        }
    }
}

/// The last `REPORT_DAYS` days ending on `today`, oldest first; days without activity are zero.
fn daily_window(daily: &BTreeMap<NaiveDate, DailyRecord>, today: NaiveDate) -> Vec<DailyAnalytics> {
    (0..REPORT_DAYS)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| {
            let record = daily.get(&date);
            DailyAnalytics {
                date: date.format("%Y-%m-%d").to_string(),
                analyses: record.map_or(0, |r| r.analyses),
                unique_users: record.map_or(0, |r| r.unique_users.len()),
            }
        })
        .collect()
}

fn average_score(performances: &[PerformanceRecord]) -> f64 {
    if performances.is_empty() {
        return 0.0;
    }
    let total: f64 = performances.iter().map(|p| p.analysis.overall_score).sum();
    total / performances.len() as f64
}

fn category_averages(performances: &[PerformanceRecord]) -> CategoryScores {
    let mut sums = CategoryScores::default();
    if performances.is_empty() {
        return sums;
    }

    for p in performances {
        let scores = &p.analysis.category_scores;
        sums.skills += scores.skills;
        sums.experience += scores.experience;
        sums.education += scores.education;
        sums.keywords += scores.keywords;
        sums.formatting += scores.formatting;
    }

    let n = performances.len() as f64;
    CategoryScores {
        skills: sums.skills / n,
        experience: sums.experience / n,
        education: sums.education / n,
        keywords: sums.keywords / n,
        formatting: sums.formatting / n,
    }
}

/// Most frequent weaknesses, highest count first; ties keep first-seen order.
fn top_weaknesses(performances: &[PerformanceRecord]) -> Vec<WeaknessCount> {
    let mut counts: Vec<WeaknessCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for weakness in performances.iter().flat_map(|p| &p.analysis.weaknesses) {
        match index.get(weakness.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(weakness.as_str(), counts.len());
                counts.push(WeaknessCount {
                    weakness: weakness.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_WEAKNESSES);
    counts
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::analysis::models::fixtures;

    fn event(email: &str, name: &str, score: f64, weaknesses: &[&str]) -> AnalysisEvent {
        AnalysisEvent {
            user_id: format!("id-{email}"),
            user_name: name.to_string(),
            user_email: email.to_string(),
            job_title: None,
            file_name: "resume.pdf".to_string(),
            file_size: 1024,
            analysis: fixtures::analysis(score, weaknesses),
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_empty_report() {
        let store = StatsStore::new();
        let report = store.report(date(10)).await;
        assert_eq!(report.summary.total_users, 0);
        assert_eq!(report.summary.total_analyses, 0);
        assert_eq!(report.summary.average_score, 0.0);
        assert_eq!(report.daily_analytics.len(), 7);
        assert_eq!(report.category_averages, CategoryScores::default());
        assert!(report.top_weaknesses.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_user_counted_once_and_refreshed() {
        let store = StatsStore::new();
        store.record(event("a@x.com", "Ann", 60.0, &[]), at(1, 9)).await;
        store.record(event("a@x.com", "Annie", 80.0, &[]), at(2, 9)).await;

        let report = store.report(date(2)).await;
        assert_eq!(report.summary.total_users, 1);
        assert_eq!(report.summary.total_analyses, 2);

        let user = &report.user_details[0];
        assert_eq!(user.user_id, "a@x.com");
        assert_eq!(user.first_name, "Annie");
        assert_eq!(user.analysis_count, 2);
        assert_eq!(user.first_seen, at(1, 9));
        assert_eq!(user.last_seen, at(2, 9));
    }

    #[tokio::test]
    async fn test_average_score_rounded_to_two_places() {
        let store = StatsStore::new();
        store.record(event("a@x.com", "A", 70.0, &[]), at(1, 9)).await;
        store.record(event("b@x.com", "B", 80.0, &[]), at(1, 10)).await;
        store.record(event("c@x.com", "C", 81.0, &[]), at(1, 11)).await;

        let report = store.report(date(1)).await;
        assert_eq!(report.summary.average_score, 77.0);

        store.record(event("d@x.com", "D", 0.0, &[]), at(1, 12)).await;
        let report = store.report(date(1)).await;
        assert_eq!(report.summary.average_score, 57.75);
        assert_eq!(report.category_averages.skills, 57.75);
    }

    #[tokio::test]
    async fn test_daily_window_is_oldest_first_and_bounded() {
        let store = StatsStore::new();
        store.record(event("a@x.com", "A", 50.0, &[]), at(1, 9)).await;
        store.record(event("a@x.com", "A", 50.0, &[]), at(8, 9)).await;
        store.record(event("b@x.com", "B", 50.0, &[]), at(8, 10)).await;

        let report = store.report(date(8)).await;
        let days: Vec<&str> = report.daily_analytics.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(days.first(), Some(&"2026-03-02"));
        assert_eq!(days.last(), Some(&"2026-03-08"));

        let today = report.daily_analytics.last().unwrap();
        assert_eq!(today.analyses, 2);
        assert_eq!(today.unique_users, 2);
        // March 1st falls outside the window.
        assert_eq!(report.summary.last_7_days_analyses, 2);
        assert_eq!(report.summary.total_analyses, 3);
    }

    #[tokio::test]
    async fn test_top_weaknesses_ordered_by_count() {
        let store = StatsStore::new();
        store.record(event("a@x.com", "A", 50.0, &["No tests", "Typos"]), at(1, 9)).await;
        store.record(event("b@x.com", "B", 50.0, &["Typos", "No cloud"]), at(1, 9)).await;
        store.record(event("c@x.com", "C", 50.0, &["Typos", "No cloud", "Gaps"]), at(1, 9)).await;
        store
            .record(event("d@x.com", "D", 50.0, &["Long", "Short", "Vague"]), at(1, 9))
            .await;

        let top = store.report(date(1)).await.top_weaknesses;
        let names: Vec<(&str, usize)> = top.iter().map(|w| (w.weakness.as_str(), w.count)).collect();
        assert_eq!(
            names,
            vec![("Typos", 3), ("No cloud", 2), ("No tests", 1), ("Gaps", 1), ("Long", 1)]
        );
    }

    #[tokio::test]
    async fn test_recent_analyses_newest_first_capped() {
        let store = StatsStore::new();
        for i in 0..12 {
            store
                .record(event(&format!("u{i}@x.com"), "U", i as f64, &[]), at(1, i))
                .await;
        }

        let recent = store.report(date(1)).await.recent_analyses;
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].score, 11.0);
        assert_eq!(recent[9].score, 2.0);
        assert_eq!(recent[0].job_title, "Not specified");
    }

    #[tokio::test]
    async fn test_simple_stats() {
        let store = StatsStore::new();
        let mut with_title = event("a@x.com", "A", 50.0, &[]);
        with_title.job_title = Some("Backend Engineer".to_string());
        store.record(with_title, at(1, 9)).await;

        let simple = store.simple().await;
        assert_eq!(simple.user_count, 1);
        assert_eq!(simple.performances[0].job_title, "Backend Engineer");
    }

    #[test]
    fn test_report_serializes_dashboard_field_names() {
        let summary = StatsSummary {
            total_users: 1,
            total_analyses: 2,
            average_score: 3.0,
            last_7_days_analyses: 4,
        };
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(value["last7DaysAnalyses"], 4);
        assert_eq!(value["totalUsers"], 1);
    }
}
