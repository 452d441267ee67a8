//! REST client for the job service.
//!
//! Implements [`JobService`] over [`reqwest`]. Status classes are mapped to
//! [`ServiceError`] here so the core never sees HTTP types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, COOKIE, PRAGMA,
};
use serde_json::Value;

use wurk_core::{JobDetail, JobId, JobService, JobSummary, ServiceError};

use crate::credentials::Credentials;

/// Production base URL.
pub const DEFAULT_BASE_URL: &str = "https://wurk.fun";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const OPEN_JOBS_PATH: &str = "/api/jobs/open?sort=newest&limit=24&offset=0";

const XSRF_HEADER: &str = "x-xsrf-token";

/// Errors while constructing the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("Invalid value for header {name}")]
    InvalidHeader { name: &'static str },
}

/// HTTP client bound to one job-service deployment and session.
pub struct WurkApi {
    client: reqwest::Client,
    base_url: String,
}

impl WurkApi {
    /// Build a client that sends the session cookie and XSRF token on every
    /// request.
    pub fn new(
        base_url: impl Into<String>,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers(credentials)?)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing [`reqwest::Client`]; its default headers are used
    /// as is.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/jobs/open`. The body is either `{"jobs": [...]}` or a bare
    /// array; any other shape, including a non-JSON body, is an empty
    /// listing.
    pub async fn open_jobs(&self) -> Result<Vec<JobSummary>, ServiceError> {
        let response = self
            .client
            .get(self.url(OPEN_JOBS_PATH))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        if let Some(err) = ServiceError::from_auth_status(status) {
            return Err(err);
        }
        if status >= 400 {
            return Err(ServiceError::HttpStatus { status });
        }

        match decode_body(response).await {
            Some(body) => Ok(jobs_from_body(body)),
            None => {
                tracing::warn!(status, "Job listing body is not JSON, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// `GET /api/jobs/{id}`. Non-2xx or undecodable bodies are `None`.
    pub async fn job(&self, id: &JobId) -> Result<Option<JobDetail>, ServiceError> {
        let response = self
            .client
            .get(self.url(&format!("/api/jobs/{id}")))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            tracing::debug!(job_id = %id, status = response.status().as_u16(), "No job detail");
            return Ok(None);
        }
        Ok(decode_body(response).await.map(JobDetail))
    }

    /// `POST /api/jobs/{id}/verify-retweet` with an empty JSON object.
    pub async fn request_verification(&self, id: &JobId) -> Result<Option<Value>, ServiceError> {
        let response = self
            .client
            .post(self.url(&format!("/api/jobs/{id}/verify-retweet")))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(transport)?;

        Self::verification_body(response).await
    }

    /// `GET /api/jobs/{id}/verify-status`.
    pub async fn verification_status(&self, id: &JobId) -> Result<Option<Value>, ServiceError> {
        let response = self
            .client
            .get(self.url(&format!("/api/jobs/{id}/verify-status")))
            .send()
            .await
            .map_err(transport)?;

        Self::verification_body(response).await
    }

    // ---- private helpers ----

    /// Verification endpoints answer with a JSON verdict even on error
    /// statuses, so only the authorization class is treated as a failure.
    async fn verification_body(response: reqwest::Response) -> Result<Option<Value>, ServiceError> {
        let status = response.status().as_u16();
        if let Some(err) = ServiceError::from_auth_status(status) {
            return Err(err);
        }
        Ok(decode_body(response).await)
    }
}

#[async_trait]
impl JobService for WurkApi {
    async fn list_open_jobs(&self) -> Result<Vec<JobSummary>, ServiceError> {
        self.open_jobs().await
    }

    async fn job_detail(&self, id: &JobId) -> Result<Option<JobDetail>, ServiceError> {
        self.job(id).await
    }

    async fn verify_retweet(&self, id: &JobId) -> Result<Option<Value>, ServiceError> {
        self.request_verification(id).await
    }

    async fn verify_status(&self, id: &JobId) -> Result<Option<Value>, ServiceError> {
        self.verification_status(id).await
    }
}

fn default_headers(credentials: &Credentials) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    let mut cookie = HeaderValue::from_str(&credentials.cookie)
        .map_err(|_| ClientError::InvalidHeader { name: "Cookie" })?;
    cookie.set_sensitive(true);
    headers.insert(COOKIE, cookie);

    if let Some(xsrf) = &credentials.xsrf {
        let mut value = HeaderValue::from_str(xsrf)
            .map_err(|_| ClientError::InvalidHeader { name: "X-XSRF-TOKEN" })?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(XSRF_HEADER), value);
    }

    Ok(headers)
}

fn transport(e: reqwest::Error) -> ServiceError {
    ServiceError::Transport(e.to_string())
}

/// Decode a JSON body; null and undecodable bodies are `None`.
async fn decode_body(response: reqwest::Response) -> Option<Value> {
    response.json::<Value>().await.ok().filter(|v| !v.is_null())
}

fn jobs_from_body(body: Value) -> Vec<JobSummary> {
    let list = match body {
        Value::Object(mut map) => match map.remove("jobs") {
            Some(Value::Null) | None => Value::Object(map),
            Some(jobs) => jobs,
        },
        other => other,
    };
    match list {
        Value::Array(items) => items.into_iter().map(JobSummary).collect(),
        _ => Vec::new(),
    }
}
