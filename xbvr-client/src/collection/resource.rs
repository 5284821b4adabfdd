//! Per-resource wiring: where a collection lives on the server and how its
//! filters travel.

use serde::Serialize;
use serde::de::DeserializeOwned;
use xbvr_model::{Actor, FileRecord, MembershipItem, MembershipList, Scene};

use crate::filters::{ACTOR_FILTERS, FILE_FILTERS, FilterSchema, SCENE_FILTERS};
use crate::infra::services::HttpMethod;

/// How the current filters are attached to a list request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTransport {
    /// Each filter travels as its own field under its wire name
    Fields,
    /// The whole filter set travels as one encoded token in `q`
    Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsEndpoint {
    pub path: &'static str,
    /// Filter keys forwarded as query params to scope the vocabularies
    pub scope: &'static [&'static str],
    /// Serve release months newest first
    pub reverse_release_months: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleEndpoint {
    pub path: &'static str,
    /// Body field carrying the item key
    pub id_field: &'static str,
    pub lists: Vec<MembershipList>,
}

/// Everything a [`CollectionStore`](super::CollectionStore) needs to know
/// about one resource. Callers may override any part before building a
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub name: &'static str,
    /// Component name used in log lines
    pub log_tag: &'static str,
    pub schema: &'static FilterSchema,
    pub list_path: &'static str,
    pub list_method: HttpMethod,
    pub transport: ListTransport,
    /// Key of the item array in the list response; `None` for a bare array
    pub items_key: Option<&'static str>,
    /// Whether the list endpoint honours offset/limit
    pub paginated: bool,
    /// Use the extended timeout ceiling for list requests
    pub extended_timeout: bool,
    pub options: Option<OptionsEndpoint>,
    pub toggle: Option<ToggleEndpoint>,
    /// Prefix for single item lookups (`{item_path}/{id}`)
    pub item_path: Option<&'static str>,
}

impl ResourceDescriptor {
    pub fn scenes() -> Self {
        Self {
            name: "scenes",
            log_tag: "SceneStore",
            schema: &SCENE_FILTERS,
            list_path: "/api/scene/list",
            list_method: HttpMethod::Get,
            transport: ListTransport::Fields,
            items_key: Some("scenes"),
            paginated: true,
            extended_timeout: false,
            options: Some(OptionsEndpoint {
                path: "/api/scene/filters/state",
                scope: &["isAvailable", "isAccessible"],
                reverse_release_months: true,
            }),
            toggle: Some(ToggleEndpoint {
                path: "/api/scene/toggle",
                id_field: "scene_id",
                lists: vec![
                    MembershipList::Watchlist,
                    MembershipList::Favourite,
                    MembershipList::Watched,
                    MembershipList::Hidden,
                    MembershipList::Trailerlist,
                    MembershipList::Wishlist,
                ],
            }),
            item_path: Some("/api/scene"),
        }
    }

    pub fn actors() -> Self {
        Self {
            name: "actors",
            log_tag: "ActorStore",
            schema: &ACTOR_FILTERS,
            list_path: "/api/actor/list",
            list_method: HttpMethod::Post,
            transport: ListTransport::Fields,
            items_key: Some("actors"),
            paginated: true,
            extended_timeout: false,
            options: Some(OptionsEndpoint {
                path: "/api/actor/filters",
                scope: &[],
                reverse_release_months: false,
            }),
            toggle: Some(ToggleEndpoint {
                path: "/api/actor/toggle",
                id_field: "actor_id",
                lists: vec![
                    MembershipList::Watchlist,
                    MembershipList::Favourite,
                    MembershipList::NeedsUpdate,
                ],
            }),
            item_path: Some("/api/actor"),
        }
    }

    pub fn files() -> Self {
        Self {
            name: "files",
            log_tag: "FileStore",
            schema: &FILE_FILTERS,
            list_path: "/api/files/list",
            list_method: HttpMethod::Post,
            transport: ListTransport::Fields,
            items_key: None,
            paginated: false,
            extended_timeout: true,
            options: None,
            toggle: None,
            item_path: None,
        }
    }

    /// Lists the toggle endpoint accepts, empty when there is none
    pub fn toggle_lists(&self) -> &[MembershipList] {
        self.toggle
            .as_ref()
            .map(|t| t.lists.as_slice())
            .unwrap_or_default()
    }
}

/// An item type that can back a [`CollectionStore`](super::CollectionStore)
pub trait Resource:
    MembershipItem<Key: Serialize> + DeserializeOwned + Clone + Send + Sync + 'static
{
    fn descriptor() -> ResourceDescriptor;
}

impl Resource for Scene {
    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::scenes()
    }
}

impl Resource for Actor {
    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::actors()
    }
}

impl Resource for FileRecord {
    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::files()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_and_actor_lists_diverge() {
        let scenes = ResourceDescriptor::scenes();
        let actors = ResourceDescriptor::actors();

        assert!(scenes.toggle_lists().contains(&MembershipList::Wishlist));
        assert!(scenes.toggle_lists().contains(&MembershipList::Hidden));
        assert!(!scenes.toggle_lists().contains(&MembershipList::NeedsUpdate));

        assert!(actors.toggle_lists().contains(&MembershipList::NeedsUpdate));
        assert!(!actors.toggle_lists().contains(&MembershipList::Wishlist));
    }

    #[test]
    fn files_have_no_toggles_or_options() {
        let files = ResourceDescriptor::files();
        assert!(files.toggle_lists().is_empty());
        assert!(files.options.is_none());
        assert!(!files.paginated);
    }

    #[test]
    fn scope_keys_exist_in_the_schema() {
        for descriptor in [
            ResourceDescriptor::scenes(),
            ResourceDescriptor::actors(),
            ResourceDescriptor::files(),
        ] {
            if let Some(options) = &descriptor.options {
                for key in options.scope {
                    assert!(descriptor.schema.field(key).is_some(), "{key}");
                }
            }
        }
    }
}
