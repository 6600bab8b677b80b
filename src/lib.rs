pub mod args;
pub mod persist;
pub mod reports;

use crate::args::{FetchArgs, ReportArgs};
use chrono::Utc;
use github_client::GithubClientBuilder;
use issue_stats::api::IssueClient;
use log::info;
use std::path::PathBuf;

/// Loads `.env` and initializes logging. Safe to call more than once.
pub fn init() {
    dotenv::dotenv().ok();
    let _ = env_logger::try_init();
}

/// Fetches the issues of the requested repository and stores them as a JSON
/// file. Returns the path of the written file.
pub async fn fetch_issues(args: FetchArgs) -> anyhow::Result<PathBuf> {
    let mut client = GithubClientBuilder::default().with_github_url(&args.api_url);
    if let Some(token) = args.api_token {
        client = client.try_with_token(token)?;
    }
    let client = client.build().await?;

    info!("Getting issues of {}", args.repo);
    let issues = client.repo_issues(&args.repo, args.state, args.per_page).await?;
    persist::save_issues(&args.out_dir, &args.repo, &issues)
}

/// Loads a stored issue list, computes the aggregations and writes the report
/// files. Returns the console rendition of the report.
pub fn build_report(args: ReportArgs) -> anyhow::Result<String> {
    let mut issues = persist::load_issues(&args.input)?;
    if args.exclude_pulls {
        issues.retain(|issue| !issue.is_pull_request);
    }
    let report = reports::Report::build(&issues, args.days, args.window_days, Utc::now());
    reports::write_files(&report, &args.out_dir, args.top)?;

    let mut summary = String::new();
    reports::console::write_summary(&mut summary, &report, args.top)?;
    Ok(summary)
}
