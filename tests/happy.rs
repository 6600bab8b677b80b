use chrono::Utc;
use issue_stats::api::StateFilter;
use issue_stats_app::args::{FetchArgs, ReportArgs};
use issue_stats_app::{build_report, fetch_issues, persist};
use rand::Rng;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OWNER: &str = "octo";
const REPO: &str = "widgets";
const FILLER_ISSUES: u64 = 30;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn happy_path_two_pages() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 5000, 4999).await;

    let first_page = json!([
        issue_body(1, "closed", Some("alice"), &["bug"], &["bob"], Some("v1.0"), 4, Some(2)),
        issue_body(2, "open", Some("alice"), &["bug", "docs"], &[], None, 0, None),
        issue_body(3, "closed", None, &[], &[], None, 1, Some(2)),
        pull_request_body(4, "open", Some("bob"), 2),
    ]);
    let mut rng = rand::thread_rng();
    let second_page: Vec<Value> = (0..FILLER_ISSUES)
        .map(|index| issue_body(100 + index, "open", Some("carol"), &[], &[], None, rng.gen_range(0..20), None))
        .collect();

    let next_link = format!(
        r#"<{0}/repos/{1}/{2}/issues?page=2>; rel="next", <{0}/repos/{1}/{2}/issues?page=2>; rel="last""#,
        server.uri(),
        OWNER,
        REPO
    );
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/issues", OWNER, REPO)))
        .and(query_param("state", "all"))
        .and(query_param("per_page", "100"))
        .and(header("Accept", "application/vnd.github.v3+json"))
        .respond_with(
            rate_limited_response(4998)
                .insert_header("link", next_link.as_str())
                .set_body_json(&first_page),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/issues", OWNER, REPO)))
        .and(query_param("page", "2"))
        .respond_with(rate_limited_response(4997).set_body_json(&second_page))
        .mount(&server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let issues_file = fetch_issues(fetch_args(&server, data_dir.path())).await.unwrap();

    let issues = persist::load_issues(&issues_file).unwrap();
    assert_eq!(issues.len() as u64, 4 + FILLER_ISSUES);
    assert_eq!(issues[0].number, 1, "Page order should be preserved");
    assert_eq!(issues[0].labels, vec!["bug".to_string()]);
    assert!(issues[3].is_pull_request);

    let report_dir = tempfile::tempdir().unwrap();
    let summary = build_report(ReportArgs {
        input: issues_file,
        out_dir: report_dir.path().to_path_buf(),
        days: 30,
        window_days: 30,
        top: 10,
        exclude_pulls: false,
    })
    .unwrap();

    assert!(summary.contains("Issues        : 34 (1 pull requests)"), "summary was:\n{}", summary);
    assert!(summary.contains("Time to close : median 2.0 days"), "summary was:\n{}", summary);

    let authors = read_json(report_dir.path(), "issues_per_author.json");
    assert_eq!(authors[0]["author"], "carol");
    assert_eq!(authors[0]["open"], FILLER_ISSUES);

    let labels = read_json(report_dir.path(), "issues_per_label.json");
    assert_eq!(labels[0]["key"], "bug");
    assert_eq!(labels[0]["count"], 2);
    assert_eq!(labels[1]["key"], "docs");

    let milestones = read_json(report_dir.path(), "issues_per_milestone.json");
    assert_eq!(milestones[0]["key"], "(none)");
    assert_eq!(milestones[0]["count"], 33);

    let histogram = read_json(report_dir.path(), "comments_histogram.json");
    let counted: u64 = histogram["buckets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|bucket| bucket["count"].as_u64().unwrap())
        .sum();
    assert_eq!(counted, 4 + FILLER_ISSUES, "Every issue lands in exactly one bucket");

    for chart in ["issues_per_author.svg", "comments_per_issue.svg", "activity.svg"] {
        let markup = std::fs::read_to_string(report_dir.path().join(chart)).unwrap();
        assert!(markup.starts_with("<svg"), "{} should be an SVG document", chart);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fetch_halts_when_rate_limit_is_exhausted() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 60, 5).await;

    let first_page = json!([
        issue_body(1, "open", Some("alice"), &[], &[], None, 0, None),
        issue_body(2, "open", Some("bob"), &[], &[], None, 0, None),
    ]);
    let next_link = format!(
        r#"<{0}/repos/{1}/{2}/issues?page=2>; rel="next""#,
        server.uri(),
        OWNER,
        REPO
    );
    // Quota runs out with this response; the next link must not be followed.
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/issues", OWNER, REPO)))
        .and(query_param("state", "all"))
        .respond_with(
            rate_limited_response(0)
                .insert_header("link", next_link.as_str())
                .set_body_json(&first_page),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/issues", OWNER, REPO)))
        .and(query_param("page", "2"))
        .respond_with(rate_limited_response(0).set_body_json(&json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let issues_file = fetch_issues(fetch_args(&server, data_dir.path())).await.unwrap();

    let issues = persist::load_issues(&issues_file).unwrap();
    assert_eq!(issues.len(), 2, "Only the already fetched page should be saved");
}

fn fetch_args(server: &MockServer, out_dir: &std::path::Path) -> FetchArgs {
    FetchArgs {
        repo: format!("{}/{}", OWNER, REPO).parse().unwrap(),
        api_token: None,
        api_url: server.uri(),
        state: StateFilter::All,
        per_page: 100,
        out_dir: out_dir.to_path_buf(),
    }
}

async fn mock_rate_limit(server: &MockServer, limit: u32, remaining: u32) {
    let body = json!({
        "resources": {
            "core": { "limit": limit, "remaining": remaining, "reset": Utc::now().timestamp() + 3600 }
        }
    });
    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn rate_limited_response(remaining: u32) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("x-ratelimit-limit", "5000")
        .insert_header("x-ratelimit-remaining", format!("{}", remaining).as_str())
        .insert_header("x-ratelimit-reset", format!("{}", Utc::now().timestamp() + 3600).as_str())
}

#[allow(clippy::too_many_arguments)]
fn issue_body(
    number: u64,
    state: &str,
    author: Option<&str>,
    labels: &[&str],
    assignees: &[&str],
    milestone: Option<&str>,
    comments: u64,
    days_to_close: Option<i64>,
) -> Value {
    let created_at = "2022-03-01T00:00:00Z";
    let closed_at = days_to_close.map(|days| format!("2022-03-{:02}T00:00:00Z", 1 + days));
    json!({
        "number": number,
        "title": format!("issue {}", number),
        "state": state,
        "comments": comments,
        "created_at": created_at,
        "updated_at": created_at,
        "closed_at": closed_at,
        "user": author.map(|login| json!({ "login": login })),
        "assignees": assignees.iter().map(|login| json!({ "login": login })).collect::<Vec<_>>(),
        "labels": labels.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
        "milestone": milestone.map(|title| json!({ "title": title })),
    })
}

fn pull_request_body(number: u64, state: &str, author: Option<&str>, comments: u64) -> Value {
    let mut body = issue_body(number, state, author, &[], &[], None, comments, None);
    body["pull_request"] = json!({ "url": format!("https://api.github.com/repos/{}/{}/pulls/{}", OWNER, REPO, number) });
    body
}

fn read_json(report_dir: &std::path::Path, name: &str) -> Value {
    let raw = std::fs::read_to_string(report_dir.join(name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}
