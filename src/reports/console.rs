use crate::reports::Report;
use core::fmt::{self, Write};
use issue_stats::analysis::{AuthorActivity, KeyCount};

const SEPARATOR_WIDTH: usize = 40;
const KEY_WIDTH: usize = 28;

/// Writes the console rendition of `report`: totals, time-to-close statistics
/// and the top-N author/label/assignee/milestone tables.
pub fn write_summary<W: Write>(writer: &mut W, report: &Report, top: usize) -> fmt::Result {
    writeln!(
        writer,
        "Issues        : {} ({} pull requests)",
        report.totals.total, report.totals.pull_requests
    )?;
    writeln!(writer, "Open          : {}", report.totals.open)?;
    writeln!(writer, "Closed        : {}", report.totals.closed)?;
    match &report.close_stats {
        Some(stats) => writeln!(
            writer,
            "Time to close : median {:.1} days, mean {:.1} days, p90 {:.1} days",
            stats.median, stats.mean, stats.p90
        )?,
        None => writeln!(writer, "Time to close : n/a")?,
    }

    write_author_table(writer, &report.authors, top)?;
    write_count_table(writer, "Top labels", &report.labels, top)?;
    write_count_table(writer, "Top assignees", &report.assignees, top)?;
    write_count_table(writer, "Milestones", &report.milestones, top)?;
    Ok(())
}

fn write_author_table<W: Write>(writer: &mut W, authors: &[AuthorActivity], top: usize) -> fmt::Result {
    write_table_header(writer, "Top authors")?;
    for author in authors.iter().take(top) {
        writeln!(
            writer,
            "    {:<KEY_WIDTH$}  open {:>5}  closed {:>5}  total {:>5}",
            truncate(&author.author, KEY_WIDTH),
            author.open,
            author.closed,
            author.total()
        )?;
    }
    Ok(())
}

fn write_count_table<W: Write>(writer: &mut W, title: &str, counts: &[KeyCount], top: usize) -> fmt::Result {
    write_table_header(writer, title)?;
    for entry in counts.iter().take(top) {
        writeln!(
            writer,
            "    {:<KEY_WIDTH$}  {:>5}",
            truncate(&entry.key, KEY_WIDTH),
            entry.count
        )?;
    }
    Ok(())
}

fn write_table_header<W: Write>(writer: &mut W, title: &str) -> fmt::Result {
    writeln!(writer)?;
    writeln!(writer, "{}", title)?;
    writeln!(writer, "{}", "─".repeat(SEPARATOR_WIDTH))?;
    Ok(())
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut result = String::new();
    for ch in text.chars() {
        if result.chars().count() + 1 >= max_width {
            break;
        }
        result.push(ch);
    }
    format!("{}…", result)
}
