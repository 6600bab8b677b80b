use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use strum_macros::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error: {0}")]
    Error(&'static str),
    // sole reason this crate depends on reqwest
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Repository coordinates, parsed from and displayed as `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let (owner, name) = value
            .split_once('/')
            .ok_or(Error::Error("Repository is not in 'owner/repo' format."))?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(Error::Error("Repository is not in 'owner/repo' format."));
        }
        Ok(RepoId {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// State filter of the issues endpoint (`?state=` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StateFilter {
    All,
    Open,
    Closed,
}

/// One issue (or pull request) record of a repository.
///
/// The issues endpoint lists pull requests too; they carry `is_pull_request` so reports can filter them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    /// Comment count as reported by the API, not the comment bodies.
    pub comments: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Author login. Absent for deleted ("ghost") accounts.
    pub author: Option<String>,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub milestone: Option<String>,
    pub is_pull_request: bool,
}

#[async_trait]
pub trait IssueClient: Send + Sync {
    /// Lists every issue of `repo` matching `state`, following pagination until exhausted.
    async fn repo_issues(&self, repo: &RepoId, state: StateFilter, per_page: u32) -> Result<Vec<Issue>>;
}

/// Tests

#[test]
fn repo_id_parse_test() {
    let repo: RepoId = "rg3/youtube-dl".parse().unwrap();
    assert_eq!(repo.owner, "rg3");
    assert_eq!(repo.name, "youtube-dl");
    assert_eq!(repo.to_string(), "rg3/youtube-dl");
}

#[test]
fn repo_id_parse_rejects_test() {
    assert!("youtube-dl".parse::<RepoId>().is_err());
    assert!("/youtube-dl".parse::<RepoId>().is_err());
    assert!("rg3/".parse::<RepoId>().is_err());
    assert!("rg3/youtube-dl/extra".parse::<RepoId>().is_err());
}

#[test]
fn state_filter_parse_test() {
    assert_eq!("all".parse::<StateFilter>().unwrap(), StateFilter::All);
    assert_eq!("closed".parse::<StateFilter>().unwrap(), StateFilter::Closed);
    assert_eq!(StateFilter::Open.to_string(), "open");
    assert!("merged".parse::<StateFilter>().is_err());
}
