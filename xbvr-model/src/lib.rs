//! Core data model definitions shared across xbvr client crates.
#![allow(missing_docs)]

pub mod actor;
pub mod error;
pub mod files;
pub mod filter_options;
pub mod ids;
pub mod membership;
pub mod page;
pub mod remote;
pub mod scene;
#[cfg(feature = "serde")]
mod serde_util;

// Intentionally curated re-exports for downstream consumers.
pub use actor::Actor;
pub use error::{ModelError, Result as ModelResult};
pub use files::{FileRecord, Volume};
pub use filter_options::FilterOptions;
pub use ids::{ActorID, FileID, SceneID, SceneKey, VolumeID};
pub use membership::{MembershipItem, MembershipList};
pub use page::{Page, ResourceCounts};
pub use remote::{RemoteSessionState, RemoteStatus};
pub use scene::{CastMember, Cuepoint, Scene, Tag};
