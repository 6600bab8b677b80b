use crate::Result;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use derive_more::Constructor;
use log::debug;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use std::str::FromStr;
use tokio::sync::Mutex;

#[derive(Constructor, Debug)]
pub struct RateLimit {
    limit: u32,
    remaining: u32,
    reset: i64,
}

pub struct RateLimiter {
    limit: Mutex<RateLimit>,
}

impl RateLimiter {
    pub(crate) fn new(limit: RateLimit) -> Self {
        RateLimiter {
            limit: Mutex::new(limit),
        }
    }

    /// Accounts for one request about to be sent.
    ///
    /// Returns `None` when quota remains, or the reset time when the limit is
    /// exhausted and the caller has to stop requesting.
    pub(crate) async fn try_acquire(&self) -> Option<DateTime<Utc>> {
        let mut rate_limit = self.limit.lock().await;
        if rate_limit.remaining > 0 {
            debug!("Remaining limit {}. Proceeding.", rate_limit.remaining);
            rate_limit.remaining -= 1;
            return None;
        }
        let now = Utc::now().timestamp();
        if rate_limit.reset < now {
            debug!("Old reset. Resetting remaining to limit.");
            rate_limit.remaining = rate_limit.limit.saturating_sub(1);
            return None;
        }
        Some(reset_time(rate_limit.reset))
    }

    pub(crate) async fn reset_limiter(&self, headers: &HeaderMap<HeaderValue>) -> Result<()> {
        let mut rate_limit = self.limit.lock().await;
        rate_limit.limit = read_header::<u32>(headers, "x-ratelimit-limit")?;
        // Min `remaining` because in case of parallel requests late response may arrive with old `remaining`
        rate_limit.remaining = std::cmp::min(
            read_header::<u32>(headers, "x-ratelimit-remaining")?,
            rate_limit.remaining,
        );
        // Max `reset` because in case of parallel requests late response may arrive with old `reset`
        rate_limit.reset = std::cmp::max(read_header::<i64>(headers, "x-ratelimit-reset")?, rate_limit.reset);
        debug!("Updated limits: {:?}", rate_limit);
        Ok(())
    }
}

fn reset_time(reset: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(reset, 0).single().unwrap_or_else(Utc::now)
}

fn read_header<T>(headers: &HeaderMap<HeaderValue>, header: &str) -> Result<T>
where
    T: FromStr,
    crate::Error: From<<T as FromStr>::Err>,
{
    let header = headers
        .get(header)
        .ok_or_else(|| format!("Header {} not found", header))
        .map(HeaderValue::to_str)??;
    Ok(header.parse::<T>()?)
}

#[tokio::test]
async fn try_acquire_test() {
    let reset = Utc::now().timestamp() + 3600;
    let limiter = RateLimiter::new(RateLimit::new(3, 1, reset));

    assert_eq!(limiter.try_acquire().await, None, "Remaining of 1 should allow a request");
    assert_eq!(
        limiter.try_acquire().await,
        Some(reset_time(reset)),
        "Exhausted limit with a future reset should stop the caller"
    );
}

#[tokio::test]
async fn try_acquire_after_reset_test() {
    let limiter = RateLimiter::new(RateLimit::new(3, 0, Utc::now().timestamp() - 1));

    assert_eq!(
        limiter.try_acquire().await,
        None,
        "Remaining should be replenished once the reset time has passed"
    );
}

#[tokio::test]
async fn reset_limiter_test() -> anyhow::Result<()> {
    let reset = Utc::now().timestamp() + 3600;
    let limiter = RateLimiter::new(RateLimit::new(60, 10, reset));

    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-limit", HeaderValue::from_str("60")?);
    headers.insert("x-ratelimit-remaining", HeaderValue::from_str("42")?);
    headers.insert("x-ratelimit-reset", HeaderValue::from_str(&format!("{}", reset - 10))?);
    limiter.reset_limiter(&headers).await?;

    // Lower `remaining` of the two wins, later `reset` of the two wins.
    let rate_limit = limiter.limit.lock().await;
    assert_eq!(rate_limit.remaining, 10);
    assert_eq!(rate_limit.reset, reset);

    Ok(())
}

#[tokio::test]
async fn reset_limiter_missing_header_test() {
    let limiter = RateLimiter::new(RateLimit::new(60, 10, 0));
    let result = limiter.reset_limiter(&HeaderMap::new()).await;
    assert!(result.is_err());
}
