use std::sync::Arc;

use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use xbvr_model::{RemoteSessionState, RemoteStatus, Scene, SceneID};

use crate::error::SyncError;
use crate::infra::config::ClientConfig;
use crate::infra::services::{ApiService, RequestOptions};

/// Websocket topic the server publishes player status on
pub const REMOTE_STATE_TOPIC: &str = "remote.state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Only sparse fields were merged
    Merged,
    /// A new scene was fetched and installed
    Transitioned { from: SceneID, to: SceneID },
    /// The player reported no scene; the current one was archived
    WentIdle,
    /// A newer event moved the session on while the scene was fetched
    Superseded,
}

#[derive(Debug, Default)]
struct SessionInner {
    state: RemoteSessionState,
    /// Bumped whenever a scene transition starts or is abandoned
    generation: u64,
    /// Scene whose fetch is in flight
    pending: Option<SceneID>,
}

/// Mirrors the remote player's session from its status feed.
///
/// The scene id and scene snapshot change together, and only once the
/// scene fetch has succeeded; a failed fetch leaves both untouched.
#[derive(Debug)]
pub struct RemoteSession {
    api: Arc<dyn ApiService>,
    scene_path: String,
    history_limit: Option<usize>,
    inner: RwLock<SessionInner>,
}

impl RemoteSession {
    pub fn new(api: Arc<dyn ApiService>) -> Self {
        Self {
            api,
            scene_path: "/api/scene".to_string(),
            history_limit: ClientConfig::default().history_limit,
            inner: RwLock::new(SessionInner::default()),
        }
    }

    pub fn from_config(api: Arc<dyn ApiService>, config: &ClientConfig) -> Self {
        Self::new(api).with_history_limit(config.history_limit)
    }

    /// `None` keeps every archived scene
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn state(&self) -> RemoteSessionState {
        self.inner.read().state.clone()
    }

    pub fn current_scene(&self) -> Option<Scene> {
        self.inner.read().state.current_scene.clone()
    }

    pub fn history(&self) -> Vec<Scene> {
        self.inner.read().state.history.iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.inner.write().state.history.clear();
    }

    /// Decode a raw feed payload and apply it.
    pub async fn process_message(&self, payload: &Value) -> Result<SyncOutcome, SyncError> {
        let status = RemoteStatus::deserialize(payload)?;
        self.process_event(status).await
    }

    /// Apply one status event.
    ///
    /// Fields present in `status` are merged, absent ones are left alone.
    /// A changed scene id triggers a fetch of the scene; the previous scene
    /// is archived when the new one is installed.
    pub async fn process_event(&self, status: RemoteStatus) -> Result<SyncOutcome, SyncError> {
        let (target, generation) = {
            let mut inner = self.inner.write();
            merge_sparse(&mut inner.state, &status);

            let Some(target) = status.current_scene_id else {
                return Ok(SyncOutcome::Merged);
            };
            if target == inner.state.current_scene_id {
                if inner.pending.take().is_some() {
                    // player went back before the fetch landed
                    inner.generation += 1;
                }
                return Ok(SyncOutcome::Merged);
            }
            if inner.pending == Some(target) {
                return Ok(SyncOutcome::Merged);
            }
            if target.is_unset() {
                self.go_idle(&mut inner);
                return Ok(SyncOutcome::WentIdle);
            }

            inner.generation += 1;
            inner.pending = Some(target);
            (target, inner.generation)
        };

        debug!("[RemoteSession] Fetching scene {}", target);
        let fetched = self.fetch_scene(target).await;

        let mut inner = self.inner.write();
        let is_current = inner.generation == generation;
        if is_current {
            inner.pending = None;
        }

        let scene = match fetched {
            Ok(scene) => scene,
            Err(err) => {
                warn!("[RemoteSession] {}", err);
                return Err(err);
            }
        };
        if !is_current {
            info!(
                "[RemoteSession] Dropping scene {}, session moved on",
                target
            );
            return Ok(SyncOutcome::Superseded);
        }

        let from = inner.state.current_scene_id;
        self.archive_current(&mut inner.state);
        inner.state.current_scene_id = target;
        inner.state.current_scene = Some(scene);
        info!("[RemoteSession] Scene {} -> {}", from, target);
        Ok(SyncOutcome::Transitioned { from, to: target })
    }

    /// Process statuses in delivery order until the stream ends.
    ///
    /// Per-event failures are logged and skipped. Returns how many events
    /// were processed.
    pub async fn drive<S>(&self, events: S) -> usize
    where
        S: Stream<Item = RemoteStatus>,
    {
        let mut events = std::pin::pin!(events);
        let mut processed = 0;
        while let Some(status) = events.next().await {
            if let Err(err) = self.process_event(status).await {
                warn!("[RemoteSession] Skipping status event: {}", err);
            }
            processed += 1;
        }
        processed
    }

    async fn fetch_scene(&self, scene_id: SceneID) -> Result<Scene, SyncError> {
        let path = format!("{}/{}", self.scene_path, scene_id);
        let body = self
            .api
            .get_json(&path, &[], RequestOptions::default())
            .await
            .map_err(|source| SyncError::SceneFetch { scene_id, source })?;
        serde_json::from_value(body).map_err(|e| SyncError::SceneDecode {
            scene_id,
            reason: e.to_string(),
        })
    }

    fn go_idle(&self, inner: &mut SessionInner) {
        inner.generation += 1;
        inner.pending = None;
        self.archive_current(&mut inner.state);
        info!(
            "[RemoteSession] Scene {} -> idle",
            inner.state.current_scene_id
        );
        inner.state.current_scene_id = SceneID::UNSET;
        inner.state.current_scene = None;
    }

    fn archive_current(&self, state: &mut RemoteSessionState) {
        if state.is_idle() {
            return;
        }
        let Some(scene) = state.current_scene.take() else {
            return;
        };
        state.history.push_back(scene);
        if let Some(limit) = self.history_limit {
            while state.history.len() > limit {
                state.history.pop_front();
            }
        }
    }
}

fn merge_sparse(state: &mut RemoteSessionState, status: &RemoteStatus) {
    if let Some(connected) = status.connected {
        state.connected = connected;
    }
    if let Some(host) = &status.deovr_host {
        state.deovr_host = host.clone();
    }
    if let Some(is_playing) = status.is_playing {
        state.is_playing = is_playing;
    }
    if let Some(position) = status.current_position {
        state.current_position = position;
    }
    if let Some(start) = status.session_start {
        state.session_start = Some(start);
    }
    if let Some(end) = status.session_end {
        state.session_end = Some(end);
    }
    if let Some(file_id) = status.current_file_id {
        state.current_file_id = file_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use xbvr_model::FileID;

    #[test]
    fn sparse_merge_touches_only_present_fields() {
        let mut state = RemoteSessionState {
            connected: true,
            deovr_host: "10.0.0.4".into(),
            current_position: 31.5,
            current_file_id: FileID(70),
            current_scene_id: SceneID(7),
            ..RemoteSessionState::default()
        };
        let before = state.clone();

        merge_sparse(&mut state, &RemoteStatus::playing(true));

        assert!(state.is_playing);
        state.is_playing = before.is_playing;
        assert_eq!(state, before);
    }

    #[test]
    fn explicit_falsy_values_are_applied() {
        let mut state = RemoteSessionState {
            connected: true,
            is_playing: true,
            current_position: 12.0,
            ..RemoteSessionState::default()
        };
        let status = RemoteStatus {
            connected: Some(false),
            is_playing: Some(false),
            current_position: Some(0.0),
            session_end: Some(Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap()),
            ..RemoteStatus::default()
        };

        merge_sparse(&mut state, &status);
        assert!(!state.connected);
        assert!(!state.is_playing);
        assert_eq!(state.current_position, 0.0);
        assert!(state.session_end.is_some());
    }

    #[test]
    fn feed_payload_decodes() {
        let status = RemoteStatus::deserialize(&json!({
            "connected": true,
            "isPlaying": false,
            "currentSceneID": 9
        }))
        .unwrap();
        assert_eq!(status.current_scene_id, Some(SceneID(9)));
        assert_eq!(status.is_playing, Some(false));

        assert!(RemoteStatus::deserialize(&json!([1, 2])).is_err());
    }
}
