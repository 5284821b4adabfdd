use chrono::{DateTime, Utc};

use crate::files::FileRecord;
use crate::ids::{ActorID, SceneID, SceneKey};
use crate::membership::{MembershipItem, MembershipList};

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub count: u64,
}

/// Cast entry as embedded in a scene payload
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CastMember {
    pub id: ActorID,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Cuepoint {
    pub id: u64,
    pub time_start: f64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Scene {
    pub id: SceneID,
    pub scene_id: SceneKey,
    pub title: String,
    pub scene_type: String,
    pub studio: String,
    pub site: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub tags: Vec<Tag>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub cast: Vec<CastMember>,
    #[cfg_attr(feature = "serde", serde(rename = "file"))]
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub files: Vec<FileRecord>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub cuepoints: Vec<Cuepoint>,
    pub duration: u32,
    pub synopsis: String,
    pub release_date_text: String,
    pub added_date: Option<DateTime<Utc>>,
    pub cover_url: String,
    pub scene_url: String,
    pub is_multipart: bool,
    pub star_rating: f64,

    pub is_available: bool,
    pub is_accessible: bool,
    pub is_scripted: bool,
    pub total_file_size: i64,
    pub total_watch_time: u64,

    // Membership flags
    pub favourite: bool,
    pub watchlist: bool,
    pub is_watched: bool,
    pub is_hidden: bool,
    pub trailerlist: bool,
    pub wishlist: bool,
    pub needs_update: bool,
}

impl MembershipItem for Scene {
    type Key = SceneKey;

    fn key(&self) -> &SceneKey {
        &self.scene_id
    }

    fn flag(&self, list: MembershipList) -> Option<bool> {
        Some(match list {
            MembershipList::Watchlist => self.watchlist,
            MembershipList::Favourite => self.favourite,
            MembershipList::Watched => self.is_watched,
            MembershipList::Hidden => self.is_hidden,
            MembershipList::Trailerlist => self.trailerlist,
            MembershipList::Wishlist => self.wishlist,
            MembershipList::NeedsUpdate => self.needs_update,
        })
    }

    fn flag_mut(&mut self, list: MembershipList) -> Option<&mut bool> {
        Some(match list {
            MembershipList::Watchlist => &mut self.watchlist,
            MembershipList::Favourite => &mut self.favourite,
            MembershipList::Watched => &mut self.is_watched,
            MembershipList::Hidden => &mut self.is_hidden,
            MembershipList::Trailerlist => &mut self.trailerlist,
            MembershipList::Wishlist => &mut self.wishlist,
            MembershipList::NeedsUpdate => &mut self.needs_update,
        })
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn sparse_payload_fills_defaults() {
        let scene: Scene = serde_json::from_value(serde_json::json!({
            "id": 12,
            "scene_id": "czechvr-412",
            "title": "Morning",
            "favourite": true,
            "file": [{ "id": 3, "filename": "a.mp4" }],
            "cast": [{ "id": 9, "name": "Someone" }]
        }))
        .expect("scene payload");

        assert_eq!(scene.id, SceneID(12));
        assert_eq!(scene.key().as_str(), "czechvr-412");
        assert!(scene.favourite);
        assert!(!scene.watchlist);
        assert_eq!(scene.files.len(), 1);
        assert_eq!(scene.cast[0].id, ActorID(9));
    }

    #[test]
    fn null_lists_decode_as_empty() {
        let scene: Scene = serde_json::from_value(serde_json::json!({
            "id": 4,
            "scene_id": "slr-4",
            "tags": null,
            "cast": null,
            "file": null,
            "cuepoints": null
        }))
        .expect("scene with null lists");

        assert!(scene.tags.is_empty());
        assert!(scene.cast.is_empty());
        assert!(scene.files.is_empty());
        assert!(scene.cuepoints.is_empty());
    }
}
