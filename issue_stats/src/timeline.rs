use crate::api::Issue;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// Opened/closed counts for one calendar day, over the rolling window ending that day.
#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct ActivityPoint {
    pub date: NaiveDate,
    /// Issues opened within the window.
    pub opened: u64,
    /// Issues closed within the window.
    pub closed: u64,
    /// Difference between opened and closed issues.
    pub spread: i64,
}

/// Arrival/closure rates over the `days_to_display` days ending at `now`.
///
/// Each point covers the rolling `window` ending at the end of its day, so
/// consecutive points overlap; a point therefore reads as "issues opened/closed
/// during the `window` leading up to this date".
pub fn activity_series(
    issues: &[Issue],
    days_to_display: Duration,
    window: Duration,
    now: DateTime<Utc>,
) -> Vec<ActivityPoint> {
    (0..=days_to_display.num_days())
        .rev()
        .map(|day| day_activity(issues, (now - Duration::days(day)).date_naive(), window))
        .collect()
}

fn day_activity(issues: &[Issue], date: NaiveDate, window: Duration) -> ActivityPoint {
    // Windows end at the day boundary, exclusive, so the whole day is covered.
    let day_end = Utc.from_utc_datetime(&(date + Duration::days(1)).and_time(NaiveTime::MIN));
    let window_start = day_end - window;

    let opened = issues
        .iter()
        .filter(|issue| issue.created_at >= window_start && issue.created_at < day_end)
        .count() as u64;

    let closed = issues
        .iter()
        .filter(|issue| {
            issue
                .closed_at
                .map_or(false, |closed_at| closed_at >= window_start && closed_at < day_end)
        })
        .count() as u64;

    ActivityPoint {
        date,
        opened,
        closed,
        spread: opened as i64 - closed as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Issue, IssueState};
    use chrono::TimeZone;

    fn issue_between(created_at: DateTime<Utc>, closed_at: Option<DateTime<Utc>>) -> Issue {
        Issue {
            number: 1,
            title: "issue".to_string(),
            state: if closed_at.is_some() { IssueState::Closed } else { IssueState::Open },
            comments: 0,
            created_at,
            updated_at: created_at,
            closed_at,
            author: Some("a".to_string()),
            assignees: Vec::new(),
            labels: Vec::new(),
            milestone: None,
            is_pull_request: false,
        }
    }

    #[test]
    fn empty_series_has_a_point_per_day() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let series = activity_series(&[], Duration::days(1), Duration::days(30), now);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].opened, 0);
        assert_eq!(series[0].closed, 0);
        assert_eq!(series[0].spread, 0);
    }

    #[test]
    fn series_counts_window_activity() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let issues = vec![
            issue_between(
                Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
                Some(Utc.with_ymd_and_hms(2024, 1, 6, 10, 0, 0).unwrap()),
            ),
            issue_between(Utc.with_ymd_and_hms(2024, 1, 9, 10, 0, 0).unwrap(), None),
        ];

        // Only the current day, with a 30 day trailing window.
        let series = activity_series(&issues, Duration::days(0), Duration::days(30), now);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, now.date_naive());
        assert_eq!(series[0].opened, 2);
        assert_eq!(series[0].closed, 1);
        assert_eq!(series[0].spread, 1);
    }

    #[test]
    fn activity_outside_window_is_ignored() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let issues = vec![issue_between(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            None,
        )];

        let series = activity_series(&issues, Duration::days(0), Duration::days(7), now);
        assert_eq!(series[0].opened, 0);
    }

    #[test]
    fn same_day_activity_is_counted_until_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        // Created later the same day, after `now`; the day's point still covers it.
        let issues = vec![issue_between(
            Utc.with_ymd_and_hms(2024, 1, 10, 23, 30, 0).unwrap(),
            None,
        )];

        let series = activity_series(&issues, Duration::days(0), Duration::days(1), now);
        assert_eq!(series[0].opened, 1);
    }
}
