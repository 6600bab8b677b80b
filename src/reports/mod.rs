pub mod console;
mod json;
mod svg;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use issue_stats::analysis::{self, AuthorActivity, DurationStats, Histogram, IssueTotals, KeyCount};
use issue_stats::api::Issue;
use issue_stats::timeline::{self, ActivityPoint};
use std::fs;
use std::path::Path;

/// Bucket count of the comment and days-to-close histograms.
const HISTOGRAM_BUCKETS: usize = 10;

/// Every aggregation of one report run, computed in one place so the
/// console, JSON and SVG writers render the same numbers.
pub struct Report {
    pub totals: IssueTotals,
    pub authors: Vec<AuthorActivity>,
    pub labels: Vec<KeyCount>,
    pub assignees: Vec<KeyCount>,
    pub milestones: Vec<KeyCount>,
    pub comments: Histogram,
    pub days_to_close: Histogram,
    pub close_stats: Option<DurationStats>,
    pub activity: Vec<ActivityPoint>,
}

impl Report {
    pub fn build(issues: &[Issue], days: u32, window_days: u32, now: DateTime<Utc>) -> Report {
        let close_days = analysis::days_to_close(issues);
        Report {
            totals: analysis::totals(issues),
            authors: analysis::issues_per_author(issues),
            labels: analysis::issues_per_label(issues),
            assignees: analysis::issues_per_assignee(issues),
            milestones: analysis::issues_per_milestone(issues),
            comments: analysis::comments_histogram(issues, HISTOGRAM_BUCKETS),
            days_to_close: analysis::histogram(&close_days, HISTOGRAM_BUCKETS),
            close_stats: analysis::duration_stats(&close_days),
            activity: timeline::activity_series(
                issues,
                Duration::days(days as i64),
                Duration::days(window_days as i64),
                now,
            ),
        }
    }
}

/// Writes the JSON exports and SVG charts under `out_dir`.
pub fn write_files(report: &Report, out_dir: &Path, top: usize) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create report directory {}", out_dir.display()))?;
    json::write_exports(report, out_dir)?;
    svg::write_charts(report, out_dir, top)?;
    Ok(())
}
