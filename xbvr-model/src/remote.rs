use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::ids::{FileID, SceneID};
use crate::scene::Scene;

/// A status snapshot from the remote player feed.
///
/// Every field is optional: only the fields present are applied to the
/// mirrored session.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RemoteStatus {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub connected: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub deovr_host: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub is_playing: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub current_position: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub session_start: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub session_end: Option<DateTime<Utc>>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "currentFileID", skip_serializing_if = "Option::is_none")
    )]
    pub current_file_id: Option<FileID>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "currentSceneID", skip_serializing_if = "Option::is_none")
    )]
    pub current_scene_id: Option<SceneID>,
}

impl RemoteStatus {
    pub fn playing(is_playing: bool) -> Self {
        Self {
            is_playing: Some(is_playing),
            ..Self::default()
        }
    }

    pub fn scene(scene_id: SceneID) -> Self {
        Self {
            current_scene_id: Some(scene_id),
            ..Self::default()
        }
    }
}

/// Client-side mirror of the remote playback session.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RemoteSessionState {
    pub connected: bool,
    pub deovr_host: String,
    pub is_playing: bool,
    pub current_position: f64,
    pub session_start: Option<DateTime<Utc>>,
    pub session_end: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "serde", serde(rename = "currentFileID"))]
    pub current_file_id: FileID,
    #[cfg_attr(feature = "serde", serde(rename = "currentSceneID"))]
    pub current_scene_id: SceneID,
    pub current_scene: Option<Scene>,
    /// Scenes that were current before a transition, oldest first
    pub history: VecDeque<Scene>,
}

impl RemoteSessionState {
    /// No scene is active
    pub fn is_idle(&self) -> bool {
        self.current_scene_id.is_unset()
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn status_reads_feed_field_names() {
        let status: RemoteStatus = serde_json::from_value(serde_json::json!({
            "isPlaying": true,
            "currentSceneID": 7,
            "currentFileID": 70,
            "deovrHost": "10.0.0.4"
        }))
        .expect("status");

        assert_eq!(status.is_playing, Some(true));
        assert_eq!(status.current_scene_id, Some(SceneID(7)));
        assert_eq!(status.current_file_id, Some(FileID(70)));
        assert_eq!(status.deovr_host.as_deref(), Some("10.0.0.4"));
        assert_eq!(status.connected, None);
        assert_eq!(status.current_position, None);
    }
}
