//! Collection stores: filtered, paginated views over scenes, actors and
//! files.

pub mod accumulator;
pub mod resource;
pub mod store;
pub mod toggle;

pub use accumulator::{LoadTicket, MergeOutcome, PageAccumulator};
pub use resource::{
    ListTransport, OptionsEndpoint, Resource, ResourceDescriptor, ToggleEndpoint,
};
pub use store::{
    ActorStore, CollectionStore, FileStore, LoadOutcome, SceneStore, StoreSnapshot,
    ToggleOutcome,
};
pub use toggle::AppliedToggle;
