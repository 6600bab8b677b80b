use crate::reports::Report;
use anyhow::Context;
use issue_stats::analysis::{DurationStats, IssueTotals};
use log::debug;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Serialize)]
struct Summary<'a> {
    totals: &'a IssueTotals,
    time_to_close_days: Option<&'a DurationStats>,
}

/// One pretty JSON file per aggregation.
pub(super) fn write_exports(report: &Report, out_dir: &Path) -> anyhow::Result<()> {
    let summary = Summary {
        totals: &report.totals,
        time_to_close_days: report.close_stats.as_ref(),
    };
    export(out_dir, "summary.json", &summary)?;
    export(out_dir, "issues_per_author.json", &report.authors)?;
    export(out_dir, "issues_per_label.json", &report.labels)?;
    export(out_dir, "issues_per_assignee.json", &report.assignees)?;
    export(out_dir, "issues_per_milestone.json", &report.milestones)?;
    export(out_dir, "comments_histogram.json", &report.comments)?;
    export(out_dir, "days_to_close_histogram.json", &report.days_to_close)?;
    export(out_dir, "activity.json", &report.activity)?;
    Ok(())
}

fn export<T: Serialize>(out_dir: &Path, name: &str, value: &T) -> anyhow::Result<()> {
    let path = out_dir.join(name);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}
