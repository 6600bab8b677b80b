use async_trait::async_trait;
use issue_stats::api;
use issue_stats::api::{Issue, IssueClient, RepoId, StateFilter};
use log::{debug, info, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

mod builder;
mod limiter;
mod pagination;
mod payload;

pub use builder::GithubClientBuilder;

use limiter::RateLimiter;

/// Crate-internal error for header bookkeeping; surfaces as [`api::Error`] at the trait boundary.
#[derive(Debug, thiserror::Error, derive_more::From)]
pub(crate) enum Error {
    #[error("{0}")]
    Header(String),
    #[error("Invalid header value: {0}")]
    HeaderValue(reqwest::header::ToStrError),
    #[error("Invalid numeric header: {0}")]
    HeaderNumber(std::num::ParseIntError),
    #[error("Invalid request url: {0}")]
    Url(url::ParseError),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

impl From<Error> for api::Error {
    fn from(err: Error) -> Self {
        api::Error::Other(anyhow::Error::new(err))
    }
}

pub struct GithubClient {
    client: Client,
    github_url: String,
    limiter: RateLimiter,
}

#[async_trait]
impl IssueClient for GithubClient {
    async fn repo_issues(&self, repo: &RepoId, state: StateFilter, per_page: u32) -> api::Result<Vec<Issue>> {
        let request_url = format!("{}/repos/{}/{}/issues", self.github_url, repo.owner, repo.name);
        let first_page = Url::parse_with_params(
            &request_url,
            &[("state", state.to_string()), ("per_page", per_page.to_string())],
        )
        .map_err(Error::from)?;

        let mut issues = Vec::new();
        let mut next = Some(first_page);
        while let Some(page_url) = next.take() {
            if let Some(reset) = self.limiter.try_acquire().await {
                warn!(
                    "API rate limit exhausted until {}. Stopping with {} issues fetched so far.",
                    reset,
                    issues.len()
                );
                break;
            }
            debug!("GET {}", page_url);
            let response = self.client.get(page_url).send().await?.error_for_status()?;
            self.limiter.reset_limiter(response.headers()).await?;
            next = pagination::next_page(response.headers());
            let page = response.json::<Vec<payload::Issue>>().await?;
            debug!("Received page of {} issues", page.len());
            issues.extend(page.into_iter().map(Issue::from));
        }
        info!("Fetched {} issues from {}", issues.len(), repo);
        Ok(issues)
    }
}

pub(crate) async fn read_response<T: DeserializeOwned>(response: Response) -> reqwest::Result<T> {
    response.error_for_status()?.json::<T>().await
}
