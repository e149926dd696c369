//! Fetches job-listing pages over HTTP.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, redirect::Policy, Client};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Config;

/// Browser-like headers; the job site serves a reduced page to unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("Job pages from '{0}' are not supported")]
    HostNotAllowed(String),

    #[error("Job page is larger than {limit_bytes} bytes")]
    TooLarge { limit_bytes: usize },

    #[error("Job page returned status {0}")]
    Status(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP fetcher for job pages. Cheap to clone; shares one connection pool.
#[derive(Clone)]
pub struct JobPageFetcher {
    client: Client,
    timeout_secs: u64,
    allowed_hosts: Arc<[String]>,
    max_page_bytes: usize,
}

impl JobPageFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let allowed_hosts: Arc<[String]> = config.job_site_hosts.clone().into();

        let redirect_hosts = allowed_hosts.clone();
        let redirects = Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if host_allowed(&redirect_hosts, attempt.url().host_str()) {
                attempt.follow()
            } else {
                attempt.stop()
            }
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(USER_AGENT)
            .redirect(redirects)
            .build()?;

        Ok(Self {
            client,
            timeout_secs: config.fetch_timeout_secs,
            allowed_hosts,
            max_page_bytes: config.max_job_page_bytes,
        })
    }

    /// GETs `url` and returns the body text.
    ///
    /// Only hosts on the allow-list are contacted, and bodies over the page limit are
    /// abandoned mid-stream. Timeouts are reported as `FetchError::Timeout` so callers can
    /// tell them apart from other network failures. Dropping the future cancels the request.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        if !host_allowed(&self.allowed_hosts, url.host_str()) {
            let host = url.host_str().unwrap_or_default().to_string();
            return Err(FetchError::HostNotAllowed(host));
        }

        debug!(%url, "fetching job page");

        let mut response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, ACCEPT)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let too_large = || FetchError::TooLarge {
            limit_bytes: self.max_page_bytes,
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_page_bytes as u64)
        {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if body.len() + chunk.len() > self.max_page_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            FetchError::Http(error)
        }
    }
}

/// An empty allow-list admits every host.
fn host_allowed(allowed: &[String], host: Option<&str>) -> bool {
    match host {
        Some(host) => allowed.is_empty() || allowed.iter().any(|h| h.eq_ignore_ascii_case(host)),
        None => false,
    }
}

/// Checks that `raw` is an http(s) URL shaped like `/companies/<company>/jobs/<job>`.
pub fn parse_job_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let is_job_path = segments
        .windows(4)
        .any(|w| w[0] == "companies" && w[2] == "jobs" && !w[1].is_empty() && !w[3].is_empty());

    is_job_path.then_some(url)
}
