use crate::api::{Issue, IssueState};
use derive_more::Constructor;
use serde::Serialize;
use std::collections::HashMap;

/// Bucket name for issues carrying no milestone.
pub const NO_MILESTONE: &str = "(none)";

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, PartialEq, Serialize, Constructor)]
pub struct AuthorActivity {
    pub author: String,
    pub open: u64,
    pub closed: u64,
}

impl AuthorActivity {
    pub fn total(&self) -> u64 {
        self.open + self.closed
    }
}

#[derive(Debug, PartialEq, Serialize, Constructor)]
pub struct KeyCount {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct IssueTotals {
    pub total: u64,
    pub pull_requests: u64,
    pub open: u64,
    pub closed: u64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Histogram {
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, PartialEq, Serialize, Constructor)]
pub struct Bucket {
    pub from: f64,
    pub to: f64,
    pub count: u64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DurationStats {
    pub count: u64,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub p90: f64,
    pub max: f64,
}

pub fn totals(issues: &[Issue]) -> IssueTotals {
    let mut totals = IssueTotals {
        total: issues.len() as u64,
        pull_requests: 0,
        open: 0,
        closed: 0,
    };
    for issue in issues {
        if issue.is_pull_request {
            totals.pull_requests += 1;
        }
        match issue.state {
            IssueState::Open => totals.open += 1,
            IssueState::Closed => totals.closed += 1,
        }
    }
    totals
}

/// Issue counts per author login, split by state and sorted by total in desc order.
///
/// Issues without an author (deleted accounts) are not counted under any key.
pub fn issues_per_author(issues: &[Issue]) -> Vec<AuthorActivity> {
    let mut by_author: HashMap<&str, (u64, u64)> = HashMap::new();
    for issue in issues {
        let author = match issue.author.as_deref() {
            Some(author) => author,
            None => continue,
        };
        let counts = by_author.entry(author).or_default();
        match issue.state {
            IssueState::Open => counts.0 += 1,
            IssueState::Closed => counts.1 += 1,
        }
    }
    let mut activity: Vec<AuthorActivity> = by_author
        .into_iter()
        .map(|(author, (open, closed))| AuthorActivity::new(author.to_string(), open, closed))
        .collect();
    activity.sort_by(|a, b| b.total().cmp(&a.total()).then_with(|| a.author.cmp(&b.author)));
    activity
}

/// Issue counts per label name, sorted by count in desc order.
///
/// An issue with several labels counts once under each of them; unlabeled issues appear nowhere.
pub fn issues_per_label(issues: &[Issue]) -> Vec<KeyCount> {
    count_keys(issues.iter().flat_map(|issue| issue.labels.iter().map(String::as_str)))
}

/// Issue counts per assignee login, sorted by count in desc order.
pub fn issues_per_assignee(issues: &[Issue]) -> Vec<KeyCount> {
    count_keys(issues.iter().flat_map(|issue| issue.assignees.iter().map(String::as_str)))
}

/// Issue counts per milestone title, sorted by count in desc order.
/// Issues without a milestone fall into the [`NO_MILESTONE`] bucket.
pub fn issues_per_milestone(issues: &[Issue]) -> Vec<KeyCount> {
    count_keys(
        issues
            .iter()
            .map(|issue| issue.milestone.as_deref().unwrap_or(NO_MILESTONE)),
    )
}

fn count_keys<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<KeyCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut counts: Vec<KeyCount> = counts
        .into_iter()
        .map(|(key, count)| KeyCount::new(key.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    counts
}

/// Per-issue comment counts bucketed into `bucket_count` equal-width bins.
pub fn comments_histogram(issues: &[Issue], bucket_count: usize) -> Histogram {
    let comments: Vec<f64> = issues.iter().map(|issue| issue.comments as f64).collect();
    histogram(&comments, bucket_count)
}

/// Time from creation to closing in fractional days, one entry per closed issue.
///
/// Records whose `closed_at` precedes `created_at` are skipped.
pub fn days_to_close(issues: &[Issue]) -> Vec<f64> {
    issues
        .iter()
        .filter_map(|issue| {
            let closed_at = issue.closed_at?;
            let seconds = (closed_at - issue.created_at).num_seconds();
            if seconds < 0 {
                return None;
            }
            Some(seconds as f64 / SECONDS_PER_DAY)
        })
        .collect()
}

/// Buckets `values` into `bucket_count` equal-width bins spanning their range.
/// Every value lands in exactly one bucket.
pub fn histogram(values: &[f64], bucket_count: usize) -> Histogram {
    if values.is_empty() {
        return Histogram { buckets: Vec::new() };
    }
    let bucket_count = bucket_count.max(1);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bucket_count as f64;
    if width == 0.0 {
        // All values equal, a single degenerate bucket holds them.
        return Histogram {
            buckets: vec![Bucket::new(min, max, values.len() as u64)],
        };
    }
    let mut counts = vec![0_u64; bucket_count];
    for value in values {
        let index = ((value - min) / width) as usize;
        counts[index.min(bucket_count - 1)] += 1;
    }
    let buckets = counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| {
            Bucket::new(
                min + index as f64 * width,
                min + (index + 1) as f64 * width,
                count,
            )
        })
        .collect();
    Histogram { buckets }
}

/// Summary statistics over a duration sample. `None` when the sample is empty.
pub fn duration_stats(values: &[f64]) -> Option<DurationStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };
    Some(DurationStats {
        count: count as u64,
        min: sorted[0],
        mean,
        median,
        p90: percentile(&sorted, 0.9),
        max: sorted[count - 1],
    })
}

/// Nearest-rank percentile over an ascending-sorted sample.
fn percentile(sorted: &[f64], percentile: f64) -> f64 {
    let rank = (percentile * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

/// Tests

#[cfg(test)]
use chrono::{Duration, TimeZone, Utc};

#[cfg(test)]
fn issue(number: u64, state: IssueState, author: Option<&str>) -> Issue {
    let created_at = Utc.with_ymd_and_hms(2022, 3, 1, 12, 0, 0).unwrap();
    Issue {
        number,
        title: format!("issue {}", number),
        state,
        comments: 0,
        created_at,
        updated_at: created_at,
        closed_at: match state {
            IssueState::Closed => Some(created_at + Duration::days(2)),
            IssueState::Open => None,
        },
        author: author.map(str::to_string),
        assignees: Vec::new(),
        labels: Vec::new(),
        milestone: None,
        is_pull_request: false,
    }
}

#[test]
fn totals_test() {
    let mut pull = issue(4, IssueState::Open, Some("a"));
    pull.is_pull_request = true;
    let issues = vec![
        issue(1, IssueState::Open, Some("a")),
        issue(2, IssueState::Closed, Some("b")),
        issue(3, IssueState::Closed, None),
        pull,
    ];
    let totals = totals(&issues);
    assert_eq!(totals.total, 4);
    assert_eq!(totals.pull_requests, 1);
    assert_eq!(totals.open, 2);
    assert_eq!(totals.closed, 2);
}

#[test]
fn issues_per_author_test() {
    let issues = vec![
        issue(1, IssueState::Open, Some("a")),
        issue(2, IssueState::Closed, Some("a")),
        issue(3, IssueState::Closed, Some("b")),
        issue(4, IssueState::Open, None),
    ];
    let activity = issues_per_author(&issues);
    assert_eq!(
        activity,
        vec![
            AuthorActivity::new("a".to_string(), 1, 1),
            AuthorActivity::new("b".to_string(), 0, 1),
        ]
    );
}

#[test]
fn issues_per_label_test() {
    let mut first = issue(1, IssueState::Open, Some("a"));
    first.labels = vec!["bug".to_string(), "help wanted".to_string()];
    let mut second = issue(2, IssueState::Open, Some("a"));
    second.labels = vec!["bug".to_string()];
    let unlabeled = issue(3, IssueState::Open, Some("a"));

    let counts = issues_per_label(&[first, second, unlabeled]);
    assert_eq!(
        counts,
        vec![
            KeyCount::new("bug".to_string(), 2),
            KeyCount::new("help wanted".to_string(), 1),
        ]
    );
}

#[test]
fn issues_per_milestone_none_bucket_test() {
    let mut planned = issue(1, IssueState::Open, Some("a"));
    planned.milestone = Some("v1.0".to_string());
    let counts = issues_per_milestone(&[planned, issue(2, IssueState::Open, Some("a"))]);
    assert_eq!(
        counts,
        vec![
            KeyCount::new(NO_MILESTONE.to_string(), 1),
            KeyCount::new("v1.0".to_string(), 1),
        ]
    );
}

#[test]
fn histogram_test() {
    let histogram = histogram(&[0.0, 1.0, 2.0, 9.0], 3);
    let counted: u64 = histogram.buckets.iter().map(|bucket| bucket.count).sum();
    assert_eq!(counted, 4);
    assert_eq!(histogram.buckets.len(), 3);
    assert_eq!(histogram.buckets[0].count, 3);
    assert_eq!(histogram.buckets[2].count, 1);
}

#[test]
fn histogram_single_value_test() {
    let histogram = histogram(&[5.0, 5.0], 10);
    assert_eq!(histogram.buckets, vec![Bucket::new(5.0, 5.0, 2)]);
}

#[test]
fn histogram_empty_test() {
    assert!(histogram(&[], 10).buckets.is_empty());
}

#[test]
fn days_to_close_test() {
    let mut backwards = issue(3, IssueState::Closed, Some("a"));
    backwards.closed_at = Some(backwards.created_at - Duration::days(1));
    let issues = vec![
        issue(1, IssueState::Closed, Some("a")),
        issue(2, IssueState::Open, Some("a")),
        backwards,
    ];
    assert_eq!(days_to_close(&issues), vec![2.0]);
}

#[test]
fn duration_stats_test() {
    let stats = duration_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
    assert_eq!(stats.count, 4);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.mean, 2.5);
    assert_eq!(stats.median, 2.5);
    assert_eq!(stats.p90, 4.0);
    assert_eq!(stats.max, 4.0);
}

#[test]
fn duration_stats_empty_test() {
    assert_eq!(duration_stats(&[]), None);
}
