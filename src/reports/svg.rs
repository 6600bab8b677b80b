use crate::reports::Report;
use anyhow::Context;
use core::fmt::{self, Write};
use issue_stats::analysis::{Histogram, KeyCount};
use issue_stats::timeline::ActivityPoint;
use log::debug;
use std::fs;
use std::path::Path;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 40.0;
/// Wider label gutter of the horizontal bar charts.
const BAR_MARGIN_LEFT: f64 = 180.0;
const GRID_LINES: usize = 5;

/// Chart colors for different series
const SERIES_COLORS: [&str; 6] = [
    "#FF9800", // Orange (primary)
    "#4CAF50", // Green
    "#2196F3", // Blue
    "#9C27B0", // Purple
    "#F44336", // Red
    "#00BCD4", // Cyan
];
const GRID_COLOR: &str = "#d0d0d0";
const TEXT_COLOR: &str = "#333333";
const MUTED_COLOR: &str = "#6b7280";

/// One SVG file per chart: bar charts for the grouped counts, histograms for
/// comments and days-to-close, a two-series line chart for the activity series.
pub(super) fn write_charts(report: &Report, out_dir: &Path, top: usize) -> anyhow::Result<()> {
    let authors: Vec<KeyCount> = report
        .authors
        .iter()
        .map(|author| KeyCount::new(author.author.clone(), author.total()))
        .collect();
    write_chart(out_dir, "issues_per_author.svg", |w| {
        bar_chart(w, "Issues per author", &authors, top)
    })?;
    write_chart(out_dir, "issues_per_label.svg", |w| {
        bar_chart(w, "Issues per label", &report.labels, top)
    })?;
    write_chart(out_dir, "issues_per_assignee.svg", |w| {
        bar_chart(w, "Issues per assignee", &report.assignees, top)
    })?;
    write_chart(out_dir, "issues_per_milestone.svg", |w| {
        bar_chart(w, "Issues per milestone", &report.milestones, top)
    })?;
    write_chart(out_dir, "comments_per_issue.svg", |w| {
        histogram_chart(w, "Comments per issue", &report.comments)
    })?;
    write_chart(out_dir, "days_to_close.svg", |w| {
        histogram_chart(w, "Days to close", &report.days_to_close)
    })?;
    write_chart(out_dir, "activity.svg", |w| {
        activity_chart(w, "Issues opened and closed", &report.activity)
    })?;
    Ok(())
}

fn write_chart(out_dir: &Path, name: &str, render: impl FnOnce(&mut String) -> fmt::Result) -> anyhow::Result<()> {
    let mut markup = String::new();
    render(&mut markup)?;
    let path = out_dir.join(name);
    fs::write(&path, markup).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Horizontal bars, one per key, widths scaled to the largest count.
fn bar_chart<W: Write>(writer: &mut W, title: &str, counts: &[KeyCount], top: usize) -> fmt::Result {
    open_svg(writer, title)?;
    let bars: Vec<&KeyCount> = counts.iter().take(top).collect();
    let max = bars.iter().map(|bar| bar.count).max().unwrap_or(0);
    if max == 0 {
        no_data(writer)?;
        return close_svg(writer);
    }

    let chart_width = WIDTH - BAR_MARGIN_LEFT - MARGIN_RIGHT;
    let chart_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let row_height = chart_height / bars.len() as f64;
    let bar_height = (row_height * 0.7).min(28.0);

    for (index, bar) in bars.iter().enumerate() {
        let y = MARGIN_TOP + index as f64 * row_height + (row_height - bar_height) / 2.0;
        let bar_width = bar.count as f64 / max as f64 * chart_width;
        writeln!(
            writer,
            r#"<text x="{}" y="{}" font-size="12" text-anchor="end" fill="{}">{}</text>"#,
            BAR_MARGIN_LEFT - 8.0,
            y + bar_height / 2.0 + 4.0,
            TEXT_COLOR,
            xml_escape(&bar.key)
        )?;
        writeln!(
            writer,
            r#"<rect x="{}" y="{}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            BAR_MARGIN_LEFT, y, bar_width, bar_height, SERIES_COLORS[0]
        )?;
        writeln!(
            writer,
            r#"<text x="{}" y="{}" font-size="12" fill="{}">{}</text>"#,
            BAR_MARGIN_LEFT + bar_width + 6.0,
            y + bar_height / 2.0 + 4.0,
            TEXT_COLOR,
            bar.count
        )?;
    }
    close_svg(writer)
}

/// Vertical bars over the histogram buckets, lower bound labeling each column.
fn histogram_chart<W: Write>(writer: &mut W, title: &str, histogram: &Histogram) -> fmt::Result {
    open_svg(writer, title)?;
    let max = histogram.buckets.iter().map(|bucket| bucket.count).max().unwrap_or(0);
    if max == 0 {
        no_data(writer)?;
        return close_svg(writer);
    }

    let chart_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    grid_lines(writer, max as f64)?;

    let column_width = chart_width / histogram.buckets.len() as f64;
    let bar_width = column_width * 0.8;
    for (index, bucket) in histogram.buckets.iter().enumerate() {
        let bar_height = bucket.count as f64 / max as f64 * chart_height;
        let x = MARGIN_LEFT + index as f64 * column_width + (column_width - bar_width) / 2.0;
        let y = MARGIN_TOP + chart_height - bar_height;
        writeln!(
            writer,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x, y, bar_width, bar_height, SERIES_COLORS[0]
        )?;
        writeln!(
            writer,
            r#"<text x="{:.1}" y="{}" font-size="10" text-anchor="middle" fill="{}">{:.1}</text>"#,
            x + bar_width / 2.0,
            HEIGHT - MARGIN_BOTTOM + 14.0,
            TEXT_COLOR,
            bucket.from
        )?;
    }
    close_svg(writer)
}

/// Opened/closed counts as two polylines over the day axis.
fn activity_chart<W: Write>(writer: &mut W, title: &str, points: &[ActivityPoint]) -> fmt::Result {
    open_svg(writer, title)?;
    if points.is_empty() {
        no_data(writer)?;
        return close_svg(writer);
    }
    // All-zero series still render, as flat lines on the baseline.
    let max = points
        .iter()
        .map(|point| point.opened.max(point.closed))
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    grid_lines(writer, max)?;

    let series = [("opened", SERIES_COLORS[0]), ("closed", SERIES_COLORS[1])];
    for (index, (name, color)) in series.iter().enumerate() {
        let x = WIDTH - MARGIN_RIGHT - 160.0 + index as f64 * 80.0;
        writeln!(writer, r#"<circle cx="{}" cy="22" r="5" fill="{}"/>"#, x, color)?;
        writeln!(
            writer,
            r#"<text x="{}" y="26" font-size="12" fill="{}">{}</text>"#,
            x + 10.0,
            TEXT_COLOR,
            name
        )?;
    }

    polyline(writer, points, |point| point.opened, SERIES_COLORS[0], max)?;
    polyline(writer, points, |point| point.closed, SERIES_COLORS[1], max)?;

    let chart_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let span = points.len() - 1;
    let labels = GRID_LINES.min(span).max(1);
    for index in 0..=labels {
        let point_index = index * span / labels;
        let x = MARGIN_LEFT + point_index as f64 / span.max(1) as f64 * chart_width;
        writeln!(
            writer,
            r#"<text x="{:.1}" y="{}" font-size="12" text-anchor="middle" fill="{}">{}</text>"#,
            x,
            HEIGHT - MARGIN_BOTTOM + 16.0,
            TEXT_COLOR,
            points[point_index].date.format("%m/%d")
        )?;
    }
    close_svg(writer)
}

fn polyline<W: Write>(
    writer: &mut W,
    points: &[ActivityPoint],
    value: impl Fn(&ActivityPoint) -> u64,
    color: &str,
    max: f64,
) -> fmt::Result {
    let chart_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let span = (points.len() - 1).max(1) as f64;
    write!(
        writer,
        r#"<polyline fill="none" stroke="{}" stroke-width="2" points=""#,
        color
    )?;
    for (index, point) in points.iter().enumerate() {
        let x = MARGIN_LEFT + index as f64 / span * chart_width;
        // Canvas y grows downward, so large values sit near the top margin.
        let y = MARGIN_TOP + (max - value(point) as f64) / max * chart_height;
        if index > 0 {
            write!(writer, " ")?;
        }
        write!(writer, "{:.1},{:.1}", x, y)?;
    }
    writeln!(writer, r#""/>"#)
}

/// Horizontal grid lines with value labels, from `max` at the top down to zero.
fn grid_lines<W: Write>(writer: &mut W, max: f64) -> fmt::Result {
    let chart_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    for index in 0..=GRID_LINES {
        let y = MARGIN_TOP + index as f64 / GRID_LINES as f64 * chart_height;
        writeln!(
            writer,
            r#"<line x1="{}" y1="{:.1}" x2="{}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
            MARGIN_LEFT,
            y,
            WIDTH - MARGIN_RIGHT,
            y,
            GRID_COLOR
        )?;
        let value = max - index as f64 / GRID_LINES as f64 * max;
        writeln!(
            writer,
            r#"<text x="{}" y="{:.1}" font-size="12" text-anchor="end" fill="{}">{:.1}</text>"#,
            MARGIN_LEFT - 6.0,
            y + 4.0,
            TEXT_COLOR,
            value
        )?;
    }
    Ok(())
}

fn open_svg<W: Write>(writer: &mut W, title: &str) -> fmt::Result {
    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif">"#,
        WIDTH, HEIGHT, WIDTH, HEIGHT
    )?;
    writeln!(writer, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        writer,
        r#"<text x="{}" y="24" font-size="16" text-anchor="middle" fill="{}">{}</text>"#,
        WIDTH / 2.0,
        TEXT_COLOR,
        xml_escape(title)
    )
}

fn close_svg<W: Write>(writer: &mut W) -> fmt::Result {
    writeln!(writer, "</svg>")
}

fn no_data<W: Write>(writer: &mut W) -> fmt::Result {
    writeln!(
        writer,
        r#"<text x="{}" y="{}" font-size="16" text-anchor="middle" fill="{}">No data</text>"#,
        WIDTH / 2.0,
        HEIGHT / 2.0,
        MUTED_COLOR
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn bar_chart_draws_a_bar_per_key() {
        let counts = vec![
            KeyCount::new("bug".to_string(), 4),
            KeyCount::new("feature".to_string(), 2),
        ];
        let mut markup = String::new();
        bar_chart(&mut markup, "Issues per label", &counts, 10).unwrap();

        assert!(markup.starts_with("<svg"));
        assert!(markup.trim_end().ends_with("</svg>"));
        assert_eq!(markup.matches("<rect x=").count(), 2);
        assert!(markup.contains("bug"));
    }

    #[test]
    fn bar_chart_without_data_renders_placeholder() {
        let mut markup = String::new();
        bar_chart(&mut markup, "Issues per label", &[], 10).unwrap();
        assert!(markup.contains("No data"));
    }

    #[test]
    fn histogram_chart_scales_to_the_largest_bucket() {
        let histogram = Histogram {
            buckets: vec![
                issue_stats::analysis::Bucket::new(0.0, 1.0, 3),
                issue_stats::analysis::Bucket::new(1.0, 2.0, 1),
            ],
        };
        let mut markup = String::new();
        histogram_chart(&mut markup, "Comments per issue", &histogram).unwrap();
        assert_eq!(markup.matches("<rect x=").count(), 2);
    }

    #[test]
    fn activity_chart_draws_two_series() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let points = vec![
            ActivityPoint {
                date,
                opened: 3,
                closed: 1,
                spread: 2,
            },
            ActivityPoint {
                date: date.succ_opt().unwrap(),
                opened: 2,
                closed: 2,
                spread: 0,
            },
        ];
        let mut markup = String::new();
        activity_chart(&mut markup, "Issues opened and closed", &points).unwrap();
        assert_eq!(markup.matches("<polyline").count(), 2);
        assert!(markup.contains("01/10"));
    }

    #[test]
    fn activity_chart_handles_a_single_point() {
        let points = vec![ActivityPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            opened: 0,
            closed: 0,
            spread: 0,
        }];
        let mut markup = String::new();
        activity_chart(&mut markup, "Issues opened and closed", &points).unwrap();
        assert_eq!(markup.matches("<polyline").count(), 2);
    }

    #[test]
    fn escapes_markup_in_labels() {
        let counts = vec![KeyCount::new("a <b> & \"c\"".to_string(), 1)];
        let mut markup = String::new();
        bar_chart(&mut markup, "Issues per label", &counts, 10).unwrap();
        assert!(markup.contains("a &lt;b&gt; &amp; &quot;c&quot;"));
    }
}
