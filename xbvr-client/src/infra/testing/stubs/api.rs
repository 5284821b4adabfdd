use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tokio::sync::oneshot;

use crate::error::{ApiError, ApiResult};
use crate::infra::services::api::{ApiService, HttpMethod, RequestOptions};

/// A request as seen by [`TestApiService`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub options: RequestOptions,
}

impl RecordedRequest {
    /// A named parameter from the query string or, failing that, the body.
    pub fn param(&self, name: &str) -> Option<String> {
        if let Some((_, v)) = self.query.iter().find(|(k, _)| k == name) {
            return Some(v.clone());
        }
        match self.body.as_ref()?.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn offset(&self) -> u64 {
        self.param("offset").and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    pub fn limit(&self) -> Option<u64> {
        self.param("limit").and_then(|v| v.parse().ok())
    }
}

pub type Handler =
    Arc<dyn Fn(&RecordedRequest) -> ApiResult<Value> + Send + Sync>;

type RouteKey = (HttpMethod, String);

#[derive(Default)]
struct InnerApiState {
    routes: HashMap<RouteKey, Handler>,
    holds: HashMap<RouteKey, VecDeque<oneshot::Receiver<()>>>,
    calls: Vec<RecordedRequest>,
}

/// Keeps the next matching request waiting until released
#[derive(Debug)]
pub struct ResponseGate {
    sender: oneshot::Sender<()>,
}

impl ResponseGate {
    pub fn release(self) {
        let _ = self.sender.send(());
    }
}

/// In-memory stand-in for the media server
#[derive(Clone)]
pub struct TestApiService {
    inner: Arc<Mutex<InnerApiState>>,
    base_url: Arc<str>,
}

impl std::fmt::Debug for TestApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("TestApiService")
            .field("base_url", &self.base_url)
            .field("routes", &inner.routes.len())
            .field("calls", &inner.calls.len())
            .finish()
    }
}

impl Default for TestApiService {
    fn default() -> Self {
        Self::new("http://localhost:9999")
    }
}

impl TestApiService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InnerApiState::default())),
            base_url: Arc::from(base_url.into()),
        }
    }

    pub fn route<F>(&self, method: HttpMethod, path: &str, handler: F)
    where
        F: Fn(&RecordedRequest) -> ApiResult<Value> + Send + Sync + 'static,
    {
        self.inner
            .lock()
            .routes
            .insert((method, path.to_string()), Arc::new(handler));
    }

    pub fn respond_json(&self, method: HttpMethod, path: &str, value: Value) {
        self.route(method, path, move |_| Ok(value.clone()));
    }

    /// Every request to the route fails with `status`
    pub fn fail(&self, method: HttpMethod, path: &str, status: u16) {
        self.route(method, path, move |_| {
            Err(ApiError::Status {
                status,
                body: "stubbed failure".to_string(),
            })
        });
    }

    /// Serve `items` with offset/limit pagination.
    ///
    /// With `items_key` the response is `{ items_key: [...], results, ..counts }`;
    /// without it the whole collection comes back as a bare array.
    pub fn serve_collection(
        &self,
        method: HttpMethod,
        path: &str,
        items: Vec<Value>,
        items_key: Option<&'static str>,
        counts: Map<String, Value>,
    ) {
        self.route(method, path, move |req| {
            let Some(key) = items_key else {
                return Ok(Value::Array(items.clone()));
            };
            let offset = req.offset() as usize;
            let limit = req.limit().map(|l| l as usize).unwrap_or(items.len());
            let page: Vec<Value> =
                items.iter().skip(offset).take(limit).cloned().collect();

            let mut body = counts.clone();
            body.insert(key.to_string(), Value::Array(page));
            body.insert("results".to_string(), json!(items.len()));
            Ok(Value::Object(body))
        });
    }

    /// The next request to the route waits until the returned gate is
    /// released (or dropped).
    pub fn hold_next(&self, method: HttpMethod, path: &str) -> ResponseGate {
        let (sender, receiver) = oneshot::channel();
        self.inner
            .lock()
            .holds
            .entry((method, path.to_string()))
            .or_default()
            .push_back(receiver);
        ResponseGate { sender }
    }

    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.inner.lock().calls.clone()
    }

    pub fn calls_to(&self, method: HttpMethod, path: &str) -> Vec<RecordedRequest> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .cloned()
            .collect()
    }

    async fn dispatch(&self, request: RecordedRequest) -> ApiResult<Value> {
        let key = (request.method, request.path.clone());
        let (handler, hold) = {
            let mut inner = self.inner.lock();
            inner.calls.push(request.clone());
            let hold = inner.holds.get_mut(&key).and_then(VecDeque::pop_front);
            (inner.routes.get(&key).cloned(), hold)
        };

        if let Some(gate) = hold {
            let _ = gate.await;
        }

        match handler {
            Some(handler) => handler(&request),
            None => Err(ApiError::NotFound(request.path)),
        }
    }
}

#[async_trait]
impl ApiService for TestApiService {
    async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
        options: RequestOptions,
    ) -> ApiResult<Value> {
        self.dispatch(RecordedRequest {
            method: HttpMethod::Get,
            path: path.to_string(),
            query: query.to_vec(),
            body: None,
            options,
        })
        .await
    }

    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        options: RequestOptions,
    ) -> ApiResult<Value> {
        self.dispatch(RecordedRequest {
            method: HttpMethod::Post,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
            options,
        })
        .await
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
