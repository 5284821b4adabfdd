use chrono::{DateTime, Utc};

use crate::ids::{FileID, SceneID, VolumeID};
use crate::membership::{MembershipItem, MembershipList};

/// A media file known to the library, matched to a scene or not
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FileRecord {
    pub id: FileID,
    pub volume_id: VolumeID,
    pub path: String,
    pub filename: String,
    pub size: i64,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub file_type: String,
    /// `SceneID::UNSET` for unmatched files
    pub scene_id: SceneID,
    pub created_time: Option<DateTime<Utc>>,
    pub updated_time: Option<DateTime<Utc>>,
    pub video_width: u32,
    pub video_height: u32,
    pub video_codec_name: String,
    pub duration: f64,
    pub projection: String,
}

impl FileRecord {
    pub fn is_matched(&self) -> bool {
        !self.scene_id.is_unset()
    }
}

// Files carry no membership flags; every toggle on them is a no-op.
impl MembershipItem for FileRecord {
    type Key = FileID;

    fn key(&self) -> &FileID {
        &self.id
    }

    fn flag(&self, _list: MembershipList) -> Option<bool> {
        None
    }

    fn flag_mut(&mut self, _list: MembershipList) -> Option<&mut bool> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Volume {
    pub id: VolumeID,
    pub path: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub volume_type: String,
    pub is_available: bool,
    pub is_enabled: bool,
    pub file_count: u64,
    pub unmatched_count: u64,
    pub total_size: i64,
}
