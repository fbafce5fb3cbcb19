//! Async client for the Jenkins remote JSON API.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::config;
use crate::history::BuildRecord;
use crate::jenkins::wire::{BuildRef, BuildStatus, JobInfo, TestReport};

/// Result type for CI server retrieval
pub type JenkinsResult<T> = Result<T, JenkinsError>;

/// Errors raised while retrieving data from the CI server
#[derive(Debug, thiserror::Error)]
pub enum JenkinsError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to set up HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Username and API token for HTTP basic auth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub token: String,
}

/// Connection settings for a CI server
#[derive(Debug, Clone)]
pub struct JenkinsConfig {
    /// Server root, may include a path prefix (e.g. `https://ci.example.com/platform`)
    pub base_url: String,
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// Timeout for a whole request
    pub request_timeout: Duration,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
    pub credentials: Option<Credentials>,
}

impl JenkinsConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let cfg = config::get();
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(cfg.http.connect_timeout),
            request_timeout: Duration::from_secs(cfg.http.request_timeout),
            accept_invalid_certs: cfg.http.accept_invalid_certs,
            credentials: cfg.http.credentials(),
        }
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn credentials(mut self, user: impl Into<String>, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            user: user.into(),
            token: token.into(),
        });
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Client for one CI server
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    http: reqwest::Client,
    base: Url,
    credentials: Option<Credentials>,
}

impl JenkinsClient {
    pub fn new(config: &JenkinsConfig) -> JenkinsResult<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| JenkinsError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(JenkinsError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(JenkinsError::Client)?;

        Ok(Self {
            http,
            base,
            credentials: config.credentials.clone(),
        })
    }

    /// `<base>/job/<job>/api/json`
    ///
    /// A folder job is addressed by its full path, e.g. `folder/job/nightly`.
    pub fn job_url(&self, job: &str) -> JenkinsResult<Url> {
        self.endpoint(job, &["api", "json"])
    }

    /// `<base>/job/<job>/<number>/api/json`
    pub fn build_url(&self, job: &str, number: u64) -> JenkinsResult<Url> {
        self.endpoint(job, &[&number.to_string(), "api", "json"])
    }

    /// `<base>/job/<job>/<number>/testReport/api/json`
    pub fn test_report_url(&self, job: &str, number: u64) -> JenkinsResult<Url> {
        self.endpoint(job, &[&number.to_string(), "testReport", "api", "json"])
    }

    /// Fetch a job and its build list
    pub async fn job(&self, job: &str) -> JenkinsResult<JobInfo> {
        let url = self.job_url(job)?;
        info!(job, url = %url, "fetching job");
        self.get_json(url).await
    }

    pub async fn build_status(&self, job: &str, number: u64) -> JenkinsResult<BuildStatus> {
        self.get_json(self.build_url(job, number)?).await
    }

    /// Fetch a build's test report. `None` when the build published none (HTTP 404).
    pub async fn test_report(&self, job: &str, number: u64) -> JenkinsResult<Option<TestReport>> {
        let url = self.test_report_url(job, number)?;
        let response = self.send(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(job, build = number, "no test report published");
            return Ok(None);
        }
        Self::decode(url, response).await.map(Some)
    }

    /// Fetch a build's status and, when it is eligible for history, its test results
    pub async fn build_record(&self, job: &str, build: &BuildRef) -> JenkinsResult<BuildRecord> {
        let status = self.build_status(job, build.number).await?;
        let record = BuildRecord::new(build.number, status.building, status.result());
        if !record.is_eligible() {
            debug!(job, build = build.number, result = ?record.result, building = record.building, "build not eligible");
            return Ok(record);
        }

        info!(job, build = build.number, url = %build.url, "reading test results");
        match self.test_report(job, build.number).await? {
            Some(report) => Ok(record.with_payload(report.into())),
            None => Ok(record),
        }
    }

    /// Job path segments are encoded one by one; `/` separates folder levels
    fn endpoint(&self, job: &str, tail: &[&str]) -> JenkinsResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| JenkinsError::InvalidUrl {
                url: self.base.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push("job")
            .extend(job.split('/').filter(|segment| !segment.is_empty()))
            .extend(tail);
        Ok(url)
    }

    async fn send(&self, url: &Url) -> JenkinsResult<reqwest::Response> {
        let mut request = self.http.get(url.clone());
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.user, Some(&credentials.token));
        }

        let response = request.send().await.map_err(|source| JenkinsError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(response)
        } else {
            Err(JenkinsError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> JenkinsResult<T> {
        let response = self.send(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(JenkinsError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND.as_u16(),
            });
        }
        Self::decode(url, response).await
    }

    async fn decode<T: DeserializeOwned>(url: Url, response: reqwest::Response) -> JenkinsResult<T> {
        let body = response.text().await.map_err(|source| JenkinsError::Request {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| JenkinsError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
