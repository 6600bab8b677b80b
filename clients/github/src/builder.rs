use crate::limiter::RateLimit;
use crate::limiter::RateLimiter;
use crate::payload::RateLimitBody;
use crate::GithubClient;
use issue_stats::api::Result;
use log::debug;
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::Client;
use reqwest::ClientBuilder;
use secrecy::ExposeSecret;

pub struct GithubClientBuilder {
    client_builder: ClientBuilder,
    github_url: String,
    headers: HeaderMap,
}

impl Default for GithubClientBuilder {
    fn default() -> Self {
        let mut headers = HeaderMap::default();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("issue_stats"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        Self {
            client_builder: ClientBuilder::default(),
            github_url: "https://api.github.com".to_string(),
            headers,
        }
    }
}

impl GithubClientBuilder {
    pub fn try_with_token(self, token: secrecy::SecretString) -> Result<GithubClientBuilder> {
        let token = format!("Bearer {}", token.expose_secret());
        Ok(self.try_with_header(header::AUTHORIZATION, token)?)
    }

    pub fn try_with_user_agent<STR: AsRef<str>>(self, user_agent: STR) -> Result<GithubClientBuilder> {
        Ok(self.try_with_header(header::USER_AGENT, user_agent)?)
    }

    pub fn with_github_url<STR: AsRef<str>>(mut self, url: STR) -> GithubClientBuilder {
        self.github_url = url.as_ref().trim_end_matches('/').to_string();
        self
    }

    fn try_with_header(mut self, key: HeaderName, val: impl AsRef<str>) -> anyhow::Result<GithubClientBuilder> {
        let val = HeaderValue::from_str(val.as_ref())?;
        self.headers.insert(key, val);
        Ok(self)
    }

    /// Builds the client and seeds its rate limiter from `GET /rate_limit`.
    pub async fn build(self) -> Result<GithubClient> {
        let client = self.client_builder.default_headers(self.headers).build()?;
        let github_url = self.github_url;
        let rate_limit = core_rate_limit(&client, github_url.as_str()).await?;
        debug!("Core rate limit at build time: {:?}", rate_limit);
        Ok(GithubClient {
            client,
            github_url,
            limiter: RateLimiter::new(rate_limit),
        })
    }
}

async fn core_rate_limit(client: &Client, github_url: impl Into<String>) -> reqwest::Result<RateLimit> {
    let request_url = format!("{}/rate_limit", github_url.into());
    let response = client.get(request_url).send().await?;
    crate::read_response::<RateLimitBody>(response).await.map(|body| {
        let core = body.resources.core;
        RateLimit::new(core.limit, core.remaining, core.reset)
    })
}
