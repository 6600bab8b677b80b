use clap::{Parser, Subcommand};
use issue_stats::api::{RepoId, StateFilter};
use secrecy::SecretString;
use std::path::PathBuf;
use std::{
    fmt::Display,
    str::FromStr,
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the issues of a repository and store them as a JSON file
    Fetch(FetchArgs),
    /// Compute statistics over a stored issue list and render reports
    Report(ReportArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Repository to fetch issues from
    #[clap(value_name = "OWNER/REPO")]
    pub repo: RepoId,

    /// API OAuth access token
    #[clap(short, long, env)]
    pub api_token: Option<SecretString>,

    /// Repository API URL
    #[clap(long, env, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Issue state to request
    #[clap(short, long, env, default_value = "all")]
    pub state: StateFilter,

    /// Issues per result page
    #[clap(long, env, default_value_t = 100, parse(try_from_str=per_page_in_range))]
    pub per_page: u32,

    /// Directory the issue file is written to
    #[clap(short, long, env, default_value = "data")]
    pub out_dir: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Issue JSON file written by the fetch command
    #[clap(value_name = "ISSUES_FILE")]
    pub input: PathBuf,

    /// Directory the report files are written to
    #[clap(short, long, env, default_value = "report")]
    pub out_dir: PathBuf,

    /// Days of history shown in the activity series
    #[clap(short, long, env, default_value_t = 90, parse(try_from_str=days_in_range))]
    pub days: u32,

    /// Rolling window of the activity series, in days
    #[clap(short, long, env, default_value_t = 30, parse(try_from_str=window_in_range))]
    pub window_days: u32,

    /// Row count of the top-N report tables
    #[clap(short, long, env, default_value_t = 10, parse(try_from_str=top_in_range))]
    pub top: usize,

    /// Leave pull requests out of the statistics
    #[clap(long, env)]
    pub exclude_pulls: bool,
}

fn per_page_in_range(value: &str) -> clap::Result<u32, String> {
    number_in_range(value, 1, 100, "per_page".to_string())
}

fn days_in_range(value: &str) -> clap::Result<u32, String> {
    number_in_range(value, 1, 3650, "days".to_string())
}

fn window_in_range(value: &str) -> clap::Result<u32, String> {
    number_in_range(value, 1, 365, "window_days".to_string())
}

fn top_in_range(value: &str) -> clap::Result<usize, String> {
    number_in_range(value, 1, 100, "top".to_string())
}

fn number_in_range<T>(value: &str, min: T, max: T, name: String) -> clap::Result<T, String>
where
    T: FromStr + PartialOrd + Display,
    <T as FromStr>::Err: Display,
{
    value.parse::<T>().map_err(|err| format!("{}", err)).and_then(|value| {
        if value < min || value > max {
            return Err(format!("{} is not in range {} .. {}.", name, min, max));
        }
        Ok(value)
    })
}
