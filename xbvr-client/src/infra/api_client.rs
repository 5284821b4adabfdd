use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::infra::services::api::{ApiService, RequestOptions};

/// HTTP client for the media server's JSON API
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Add a scheme when missing and drop trailing slashes so paths join cleanly.
pub(crate) fn normalize_base_url(raw: &str) -> ApiResult<String> {
    let invalid = || ApiError::InvalidUrl(raw.to_string());
    let input = raw.trim();
    // Split the scheme off before trimming, or "http://" collapses to "http:".
    let (scheme, rest) = match input.split_once("://") {
        Some((scheme @ ("http" | "https"), rest)) => (scheme, rest),
        Some(_) => return Err(invalid()),
        None => ("http", input),
    };
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(invalid());
    }
    let with_scheme = format!("{scheme}://{rest}");

    let parsed = Url::parse(&with_scheme)
        .map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }

    if with_scheme != raw {
        warn!(
            "[ApiClient] Normalized base URL from '{}' to '{}'",
            raw, with_scheme
        );
    }
    Ok(with_scheme)
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            // In development, don't follow redirects to avoid HTTP->HTTPS issues
            .redirect(if cfg!(debug_assertions) {
                reqwest::redirect::Policy::none()
            } else {
                reqwest::redirect::Policy::default()
            })
            .build()?;

        info!(
            "[ApiClient] Creating new API client with base URL: {}",
            base_url
        );

        Ok(Self { client, base_url })
    }

    fn apply_options(
        builder: RequestBuilder,
        options: RequestOptions,
    ) -> RequestBuilder {
        match options.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    /// Execute a request and handle common errors
    async fn execute_request(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> ApiResult<Value> {
        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => {
                let text = response.text().await?;
                if text.trim().is_empty() {
                    // Toggle endpoints answer 200 with no body
                    return Ok(Value::Null);
                }
                serde_json::from_str(&text)
                    .map_err(|e| ApiError::Deserialization(e.to_string()))
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(url.to_string())),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(ApiError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl ApiService for ApiClient {
    async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
        options: RequestOptions,
    ) -> ApiResult<Value> {
        let url = self.build_url(path);
        debug!("[ApiClient] GET {} ({} params)", url, query.len());
        let request =
            Self::apply_options(self.client.get(&url).query(query), options);
        self.execute_request(&url, request).await
    }

    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        options: RequestOptions,
    ) -> ApiResult<Value> {
        let url = self.build_url(path);
        debug!("[ApiClient] POST {}", url);
        let request =
            Self::apply_options(self.client.post(&url).json(body), options);
        self.execute_request(&url, request).await
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
