//! Shared fixtures for the xbvr-client integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use xbvr_client::ApiService;
use xbvr_client::infra::testing::TestApiService;

pub fn stub() -> (TestApiService, Arc<dyn ApiService>) {
    let stub = TestApiService::default();
    let api: Arc<dyn ApiService> = Arc::new(stub.clone());
    (stub, api)
}

pub fn scene_json(id: u64) -> Value {
    json!({
        "id": id,
        "scene_id": format!("site-{id}"),
        "title": format!("Scene {id}"),
        "site": "Site",
        "cast": [{ "id": id * 10, "name": format!("Performer {id}") }],
        "favourite": false,
        "watchlist": false
    })
}

pub fn scenes(ids: impl IntoIterator<Item = u64>) -> Vec<Value> {
    ids.into_iter().map(scene_json).collect()
}

pub fn actor_json(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("Performer {id}"),
        "count": 3,
        "favourite": false,
        "needs_update": false
    })
}

pub fn file_json(id: u64) -> Value {
    json!({
        "id": id,
        "filename": format!("file-{id}.mp4"),
        "size": 1024 * id,
        "type": "video",
        "scene_id": 0
    })
}

/// Wait until the stub has seen `count` requests to the route.
pub async fn wait_for_calls(
    stub: &TestApiService,
    method: xbvr_client::HttpMethod,
    path: &str,
    count: usize,
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while stub.calls_to(method, path).len() < count {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("request was never issued");
}
