use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use thiserror::Error;

/// `Accept` value sent with every request. Some feed origins refuse requests
/// that do not look like they come from a browser.
pub const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// `User-Agent` value sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36 Edg/113.0.1774.57";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Extra attempts after the first failed one.
    pub retry_limit: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            retry_limit: 3,
        }
    }
}

/// Failure of a single fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

/// Failure that survived the retry ceiling. Carries the last underlying
/// failure and the URL it happened for.
#[derive(Debug, Clone, Error)]
#[error("fetch of {url} gave up after {attempts} attempts: {last}")]
pub struct FetchExhausted {
    pub url: String,
    pub attempts: usize,
    #[source]
    pub last: FetchFailure,
}

/// One HTTP GET attempt. The retry policy lives in [`RetryingFetcher`].
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchFailure> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchFailure::Network(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        let parsed =
            url::Url::parse(url).map_err(|err| FetchFailure::InvalidUrl(err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(body.to_vec())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        return FetchFailure::Timeout;
    }
    FetchFailure::Network(err.to_string())
}

/// Wraps any [`Fetcher`] with immediate retry up to a fixed ceiling. The same
/// policy governs feed-document retrieval and every asset download.
#[derive(Clone)]
pub struct RetryingFetcher {
    inner: Arc<dyn Fetcher>,
    retry_limit: usize,
}

impl RetryingFetcher {
    pub fn new(inner: Arc<dyn Fetcher>, retry_limit: usize) -> Self {
        Self { inner, retry_limit }
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchExhausted> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let failure = match self.inner.fetch(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(failure) => failure,
            };
            log::warn!(
                "fetch attempt {attempt}/{} for {url} failed: {failure}",
                self.retry_limit + 1
            );
            if attempt > self.retry_limit {
                return Err(FetchExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last: failure,
                });
            }
        }
    }
}
