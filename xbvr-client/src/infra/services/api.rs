//! API service trait
//!
//! Abstraction over the HTTP transport so stores and the remote session can
//! run against the real server or an in-memory stub.

use std::fmt::{self, Debug};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// Per-request knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the client-wide timeout when set
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Generic API service trait for server communication
#[async_trait]
pub trait ApiService: Send + Sync + Debug {
    /// GET `path` with query parameters, returning the decoded JSON body.
    async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
        options: RequestOptions,
    ) -> ApiResult<Value>;

    /// POST a JSON body to `path`. An empty response body yields `Value::Null`.
    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        options: RequestOptions,
    ) -> ApiResult<Value>;

    /// Build a full URL from a path
    fn build_url(&self, path: &str) -> String;

    /// Get the base URL
    fn base_url(&self) -> &str;
}
