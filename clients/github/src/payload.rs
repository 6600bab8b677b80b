use chrono::{DateTime, Utc};
use issue_stats::api;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub state: api::IssueState,
    #[serde(default)]
    pub comments: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub user: Option<User>,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub milestone: Option<Milestone>,
    /// Present only when the record is a pull request.
    pub pull_request: Option<PullRequestMarker>,
}

#[derive(Deserialize, Debug)]
pub struct User {
    pub login: String,
}

#[derive(Deserialize, Debug)]
pub struct Label {
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct Milestone {
    pub title: String,
}

#[derive(Deserialize, Debug)]
pub struct PullRequestMarker {
    #[serde(default)]
    pub url: Option<String>,
}

impl From<Issue> for api::Issue {
    fn from(issue: Issue) -> Self {
        api::Issue {
            number: issue.number,
            title: issue.title,
            state: issue.state,
            comments: issue.comments,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            closed_at: issue.closed_at,
            author: issue.user.map(|user| user.login),
            assignees: issue.assignees.into_iter().map(|user| user.login).collect(),
            labels: issue.labels.into_iter().map(|label| label.name).collect(),
            milestone: issue.milestone.map(|milestone| milestone.title),
            is_pull_request: issue.pull_request.is_some(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct RateLimitBody {
    pub resources: RateLimitResources,
}

#[derive(Deserialize, Debug)]
pub struct RateLimitResources {
    pub core: RateLimitResource,
}

#[derive(Deserialize, Debug)]
pub struct RateLimitResource {
    pub limit: u32,
    pub remaining: u32,
    pub reset: i64,
}

/// Tests

#[test]
fn issue_payload_test() {
    let body = r#"{
        "number": 12,
        "title": "Playlist download hangs",
        "state": "closed",
        "comments": 3,
        "created_at": "2022-03-01T10:00:00Z",
        "updated_at": "2022-03-04T09:30:00Z",
        "closed_at": "2022-03-04T09:30:00Z",
        "user": { "login": "alice" },
        "assignees": [{ "login": "bob" }],
        "labels": [{ "name": "bug" }],
        "milestone": { "title": "v1.0" },
        "pull_request": { "url": "https://api.github.com/repos/o/r/pulls/12" }
    }"#;

    let issue: api::Issue = serde_json::from_str::<Issue>(body).unwrap().into();
    assert_eq!(issue.number, 12);
    assert_eq!(issue.state, api::IssueState::Closed);
    assert_eq!(issue.comments, 3);
    assert_eq!(issue.author.as_deref(), Some("alice"));
    assert_eq!(issue.assignees, vec!["bob".to_string()]);
    assert_eq!(issue.labels, vec!["bug".to_string()]);
    assert_eq!(issue.milestone.as_deref(), Some("v1.0"));
    assert!(issue.is_pull_request);
    assert!(issue.closed_at.is_some());
}

#[test]
fn issue_payload_sparse_test() {
    // Ghost author, nothing assigned, plain issue.
    let body = r#"{
        "number": 7,
        "title": "Crash on startup",
        "state": "open",
        "comments": 0,
        "created_at": "2022-03-01T10:00:00Z",
        "updated_at": "2022-03-01T10:00:00Z",
        "closed_at": null,
        "user": null,
        "assignees": [],
        "labels": [],
        "milestone": null
    }"#;

    let issue: api::Issue = serde_json::from_str::<Issue>(body).unwrap().into();
    assert_eq!(issue.author, None);
    assert!(issue.assignees.is_empty());
    assert!(issue.labels.is_empty());
    assert_eq!(issue.milestone, None);
    assert!(!issue.is_pull_request);
}
