//! HTTP client for the content backend

use std::time::Duration;

use pressroom_shared::{validate_directives, AdDirective, PlacementKind, RawAdDirective, TenantId};
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::Post;

/// Maximum number of retry attempts for transient failures
const MAX_RETRIES: usize = 3;

/// Initial backoff duration for retries (100ms)
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Maximum backoff duration for retries (2 seconds)
const RETRY_MAX_DELAY: Duration = Duration::from_secs(2);

/// Error type for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend returned status {0}")]
    Status(u16),

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            // Network failures, timeouts and server-side errors
            BackendError::Http(_) => true,
            BackendError::Status(code) => *code >= 500,

            BackendError::Json(_) => false,
            BackendError::NotFound => false,
            BackendError::InvalidUrl(_) => false,
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Client for the content backend REST API
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
    max_retries: usize,
    retry_max_delay: Duration,
}

impl BackendClient {
    /// Create a new client rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> BackendResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            http,
            base_url,
            max_retries: MAX_RETRIES,
            retry_max_delay: RETRY_MAX_DELAY,
        })
    }

    /// Override the retry budget
    pub fn with_retry_limits(mut self, max_retries: usize, max_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_max_delay = max_delay;
        self
    }

    /// Fetch the validated inline ad directives for a tenant's page kind
    pub async fn fetch_inline_ads(
        &self,
        tenant: &TenantId,
        page: &str,
    ) -> BackendResult<Vec<AdDirective>> {
        let mut url = self.endpoint(&["tenants", tenant.as_str(), "ad-placements"])?;
        url.query_pairs_mut()
            .append_pair("placement", PlacementKind::Inline.as_str())
            .append_pair("page", page);

        let raws: Vec<RawAdDirective> = self.get_json(&url).await?;
        let received = raws.len();
        let directives = validate_directives(raws);

        tracing::debug!(
            tenant = %tenant,
            page,
            received,
            accepted = directives.len(),
            "Fetched inline ad directives"
        );

        Ok(directives)
    }

    /// Fetch a published post
    pub async fn fetch_post(&self, tenant: &TenantId, slug: &str) -> BackendResult<Post> {
        let url = self.endpoint(&["tenants", tenant.as_str(), "posts", slug])?;
        self.get_json(&url).await
    }

    /// Check that the backend answers its health endpoint (no retries)
    pub async fn ping(&self) -> BackendResult<()> {
        let url = self.endpoint(&["health"])?;
        let response = self.http.get(url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Status(response.status().as_u16()))
        }
    }

    fn endpoint(&self, segments: &[&str]) -> BackendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with retry logic
    ///
    /// Only transient errors (network issues, timeouts, 5xx) are retried.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> BackendResult<T> {
        use tokio_retry::strategy::{jitter, ExponentialBackoff};
        use tokio_retry::Retry;

        let retry_strategy = ExponentialBackoff::from_millis(RETRY_BASE_DELAY.as_millis() as u64)
            .max_delay(self.retry_max_delay)
            .take(self.max_retries)
            .map(jitter);

        Retry::spawn(retry_strategy, move || async move {
            let result = self.get_json_once(url).await;

            match &result {
                Ok(_) => Ok(result),
                Err(e) if e.is_transient() => {
                    tracing::debug!(url = %url, error = %e, "Transient backend error - will retry");
                    Err(result) // Return error to trigger retry
                }
                Err(_) => Ok(result), // Wrapped in Ok to stop retrying
            }
        })
        .await
        .unwrap_or_else(|e| e)
    }

    async fn get_json_once<T: DeserializeOwned>(&self, url: &Url) -> BackendResult<T> {
        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound);
        }
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
