use anyhow::Context;
use chrono::Utc;
use issue_stats::api::{Issue, RepoId};
use log::info;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Saves the issue list as pretty JSON under `out_dir`.
///
/// The file is named `{owner}_{repo}_issues_{unix_timestamp}.json`, so repeated
/// fetches of the same repository never overwrite each other.
pub fn save_issues(out_dir: &Path, repo: &RepoId, issues: &[Issue]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create data directory {}", out_dir.display()))?;
    let file_name = format!("{}_{}_issues_{}.json", repo.owner, repo.name, Utc::now().timestamp());
    let path = out_dir.join(file_name);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), issues)
        .with_context(|| format!("Failed to write issues to {}", path.display()))?;
    info!("Saved {} issues to {}", issues.len(), path.display());
    Ok(path)
}

/// Loads an issue list previously written by [`save_issues`].
pub fn load_issues(path: &Path) -> anyhow::Result<Vec<Issue>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse issues from {}", path.display()))
}
