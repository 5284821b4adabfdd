//! Client-side state for an xbvr media library: filterable, paginated
//! collection stores for scenes, actors and files, and a mirror of the
//! remote player session.

pub mod collection;
pub mod error;
pub mod filters;
pub mod infra;
pub mod remote;

pub use collection::{
    ActorStore, CollectionStore, FileStore, LoadOutcome, Resource,
    ResourceDescriptor, SceneStore, StoreSnapshot, ToggleOutcome,
};
pub use error::{ApiError, ApiResult, DecodeError, StoreError, StoreResult, SyncError};
pub use filters::{FilterSet, FilterValue, MergeReport};
pub use infra::{ApiClient, ApiService, ClientConfig, HttpMethod, RequestOptions};
pub use remote::{RemoteSession, SyncOutcome};
