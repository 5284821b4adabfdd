use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use xbvr_model::{
    Actor, FileRecord, FilterOptions, MembershipList, Page, ResourceCounts,
    Scene,
};

use super::accumulator::{LoadTicket, MergeOutcome, PageAccumulator};
use super::resource::{ListTransport, Resource, ResourceDescriptor};
use super::toggle;
use crate::error::{ApiResult, DecodeError, StoreError, StoreResult};
use crate::filters::{self, FilterSet, FilterValue, MergeReport};
use crate::infra::config::ClientConfig;
use crate::infra::services::{ApiService, HttpMethod, RequestOptions};

pub type SceneStore = CollectionStore<Scene>;
pub type ActorStore = CollectionStore<Actor>;
pub type FileStore = CollectionStore<FileRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was merged into the item list
    Applied {
        received: usize,
        len: usize,
        total: u64,
    },
    /// A newer load or a filter change overtook this one; nothing merged
    Superseded,
    /// Every item is already loaded
    Complete,
    /// A load is already in flight
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Flag flipped locally and acknowledged by the server
    Applied { value: bool },
    /// Item not loaded, or the list does not apply to this resource
    NoOp,
}

/// Point-in-time copy of a store's observable state
#[derive(Debug, Clone)]
pub struct StoreSnapshot<T> {
    pub items: Vec<T>,
    pub offset: u64,
    pub total: u64,
    pub limit: u64,
    pub loading: bool,
    pub loaded: bool,
    pub counts: ResourceCounts,
    pub filters: FilterSet,
    pub options: Option<FilterOptions>,
    /// The collection is served in pages rather than whole
    pub paginated: bool,
}

impl<T> StoreSnapshot<T> {
    /// Another `load_next_page` would fetch something
    pub fn has_more(&self) -> bool {
        !self.loaded || (self.paginated && self.offset < self.total)
    }
}

#[derive(Debug)]
struct StoreState<T> {
    filters: FilterSet,
    page: PageAccumulator<T>,
    options: Option<FilterOptions>,
}

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Query(Vec<(String, String)>),
    Body(Value),
}

/// Filterable, paginated view over one server collection.
///
/// Each store owns its filters, accumulated items and facet cache. State
/// sits behind a lock that is never held across a request, so stores can be
/// shared freely between tasks.
pub struct CollectionStore<T: Resource> {
    api: Arc<dyn ApiService>,
    descriptor: ResourceDescriptor,
    extended_timeout: Duration,
    state: RwLock<StoreState<T>>,
}

impl<T: Resource + fmt::Debug> fmt::Debug for CollectionStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionStore")
            .field("resource", &self.descriptor.name)
            .field("state", &*self.state.read())
            .finish()
    }
}

impl<T: Resource> CollectionStore<T> {
    pub fn new(api: Arc<dyn ApiService>, limit: u64) -> Self {
        Self::with_descriptor(api, T::descriptor(), limit)
    }

    pub fn with_descriptor(
        api: Arc<dyn ApiService>,
        descriptor: ResourceDescriptor,
        limit: u64,
    ) -> Self {
        let state = StoreState {
            filters: FilterSet::new(descriptor.schema),
            page: PageAccumulator::new(limit),
            options: None,
        };
        Self {
            api,
            descriptor,
            extended_timeout: ClientConfig::default().extended_timeout(),
            state: RwLock::new(state),
        }
    }

    pub fn from_config(api: Arc<dyn ApiService>, config: &ClientConfig) -> Self {
        Self::new(api, config.page_limit).with_extended_timeout(config.extended_timeout())
    }

    pub fn with_extended_timeout(mut self, timeout: Duration) -> Self {
        self.extended_timeout = timeout;
        self
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    fn tag(&self) -> &'static str {
        self.descriptor.log_tag
    }

    // ---- Reads ----

    pub fn snapshot(&self) -> StoreSnapshot<T> {
        let state = self.state.read();
        StoreSnapshot {
            items: state.page.items().to_vec(),
            offset: state.page.offset(),
            total: state.page.total(),
            limit: state.page.limit(),
            loading: state.page.is_loading(),
            loaded: state.page.is_loaded(),
            counts: state.page.counts().clone(),
            filters: state.filters.clone(),
            options: state.options.clone(),
            paginated: self.descriptor.paginated,
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.state.read().page.items().to_vec()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().page.is_loading()
    }

    pub fn counts(&self) -> ResourceCounts {
        self.state.read().page.counts().clone()
    }

    pub fn filter_options(&self) -> Option<FilterOptions> {
        self.state.read().options.clone()
    }

    pub fn filters(&self) -> FilterSet {
        self.state.read().filters.clone()
    }

    /// Shareable token for the current filters
    pub fn filter_token(&self) -> String {
        filters::encode(&self.state.read().filters)
    }

    // ---- Filters ----

    /// Merge the entries of a filter token into the live filters.
    ///
    /// Keys absent from the token keep their current value. A malformed
    /// token leaves the filters untouched and the error is returned for the
    /// caller to report. Returns the number of keys applied.
    pub fn set_filters_from_token(&self, token: &str) -> Result<usize, DecodeError> {
        let patch = match filters::decode_patch(self.descriptor.schema, token) {
            Ok(patch) => patch,
            Err(err) => {
                warn!(
                    "[{}] Ignoring filter token, keeping current filters: {}",
                    self.tag(),
                    err
                );
                return Err(err);
            }
        };

        let mut state = self.state.write();
        let before = state.filters.clone();
        let applied = state.filters.apply(patch);
        Self::invalidate_if_changed(&mut state, &before, self.tag());
        Ok(applied)
    }

    /// Merge individually supplied fields (e.g. route query params).
    pub fn set_filters_from_fields(&self, fields: &Map<String, Value>) -> MergeReport {
        let mut state = self.state.write();
        let before = state.filters.clone();
        let report = filters::merge_fields(&mut state.filters, fields);
        Self::invalidate_if_changed(&mut state, &before, self.tag());
        report
    }

    pub fn set_filter(&self, key: &str, value: FilterValue) -> Result<(), DecodeError> {
        let mut state = self.state.write();
        let before = state.filters.clone();
        state.filters.set(key, value)?;
        Self::invalidate_if_changed(&mut state, &before, self.tag());
        Ok(())
    }

    pub fn reset_filters(&self) {
        let mut state = self.state.write();
        let before = state.filters.clone();
        state.filters.reset();
        Self::invalidate_if_changed(&mut state, &before, self.tag());
    }

    // A new query starts a new list: loads issued under the old filters are
    // dropped and the next continuation reloads from offset 0.
    fn invalidate_if_changed(
        state: &mut StoreState<T>,
        before: &FilterSet,
        tag: &str,
    ) {
        if state.filters.same_query(before) {
            return;
        }
        let dropped = state.page.is_loading();
        state.page.reset_cursor();
        debug!(
            "[{}] Filters changed, restarting at generation {}{}",
            tag,
            state.page.generation(),
            if dropped { " (in-flight loads dropped)" } else { "" }
        );
    }

    // ---- Filter options ----

    pub async fn load_filter_options(&self) -> StoreResult<FilterOptions> {
        self.load_filter_options_with(None).await
    }

    /// Fetch facet vocabularies and cache them. Repeated calls refresh.
    pub async fn load_filter_options_with(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> StoreResult<FilterOptions> {
        let Some(endpoint) = self.descriptor.options.clone() else {
            return Err(StoreError::Unsupported {
                resource: self.descriptor.name,
                operation: "filter options",
            });
        };

        let query: Vec<(String, String)> = {
            let state = self.state.read();
            endpoint
                .scope
                .iter()
                .filter_map(|key| {
                    let spec = self.descriptor.schema.field(key)?;
                    let value = state.filters.get(key)?;
                    Some((spec.wire.to_string(), value.to_query_value()))
                })
                .collect()
        };

        let body = Self::cancellable(
            cancel,
            self.api
                .get_json(endpoint.path, &query, RequestOptions::default()),
        )
        .await?;

        let mut options: FilterOptions = if body.is_null() {
            FilterOptions::default()
        } else {
            serde_json::from_value(body)
                .map_err(|e| StoreError::Decode(e.to_string()))?
        };
        if endpoint.reverse_release_months {
            options.release_months.reverse();
        }

        debug!(
            "[{}] Loaded filter options: {} cast, {} sites, {} tags",
            self.tag(),
            options.cast.len(),
            options.sites.len(),
            options.tags.len()
        );
        self.state.write().options = Some(options.clone());
        Ok(options)
    }

    // ---- Pages ----

    pub async fn load_page(&self, offset: u64) -> StoreResult<LoadOutcome> {
        self.load_page_with(offset, None).await
    }

    /// Load one page with the current filters.
    ///
    /// Offset 0 replaces the item list once the response arrives; any other
    /// offset appends. Failure and cancellation leave the items untouched.
    pub async fn load_page_with(
        &self,
        offset: u64,
        cancel: Option<&CancellationToken>,
    ) -> StoreResult<LoadOutcome> {
        let (ticket, payload) = {
            let mut state = self.state.write();
            let ticket = state.page.begin(offset);
            (ticket, self.list_payload(&state.filters, ticket))
        };
        debug!(
            "[{}] Loading offset {} limit {} (generation {})",
            self.tag(),
            ticket.offset,
            ticket.limit,
            ticket.generation
        );

        let result = Self::cancellable(cancel, self.send_list(payload))
            .await
            .and_then(|body| self.parse_page(body, ticket));

        let mut state = self.state.write();
        match result {
            Ok(page) => match state.page.commit(ticket, page) {
                MergeOutcome::Applied {
                    received,
                    len,
                    total,
                } => {
                    debug!(
                        "[{}] Merged {} items at offset {}, now {} of {}",
                        self.tag(),
                        received,
                        ticket.offset,
                        len,
                        total
                    );
                    Ok(LoadOutcome::Applied {
                        received,
                        len,
                        total,
                    })
                }
                MergeOutcome::Superseded => {
                    info!(
                        "[{}] Dropping stale response for offset {} (generation {})",
                        self.tag(),
                        ticket.offset,
                        ticket.generation
                    );
                    Ok(LoadOutcome::Superseded)
                }
            },
            Err(err) if !state.page.is_current(&ticket) => {
                debug!(
                    "[{}] Stale load for offset {} failed: {}",
                    self.tag(),
                    ticket.offset,
                    err
                );
                Ok(LoadOutcome::Superseded)
            }
            Err(err) => {
                state.page.fail(ticket);
                warn!(
                    "[{}] Load at offset {} failed: {}",
                    self.tag(),
                    ticket.offset,
                    err
                );
                Err(err)
            }
        }
    }

    /// Load the page after the last one requested, or the first page when
    /// nothing is loaded yet.
    pub async fn load_next_page(&self) -> StoreResult<LoadOutcome> {
        let offset = {
            let state = self.state.read();
            if state.page.is_loading() {
                return Ok(LoadOutcome::Skipped);
            }
            if !state.page.is_loaded() {
                0
            } else if !self.descriptor.paginated
                || state.page.offset() >= state.page.total()
            {
                return Ok(LoadOutcome::Complete);
            } else {
                state.page.offset()
            }
        };
        self.load_page(offset).await
    }

    fn list_payload(&self, filters: &FilterSet, ticket: LoadTicket) -> Payload {
        let paginated = self.descriptor.paginated;
        let method = self.descriptor.list_method;

        match (self.descriptor.transport, method) {
            (ListTransport::Fields, HttpMethod::Get) => {
                let mut query = Vec::new();
                if paginated {
                    query.push(("offset".to_string(), ticket.offset.to_string()));
                    query.push(("limit".to_string(), ticket.limit.to_string()));
                }
                query.extend(
                    filters
                        .query_fields()
                        .map(|(spec, v)| (spec.wire.to_string(), v.to_query_value())),
                );
                Payload::Query(query)
            }
            (ListTransport::Fields, HttpMethod::Post) => {
                let mut body: Map<String, Value> = filters
                    .query_fields()
                    .map(|(spec, v)| (spec.wire.to_string(), v.to_json()))
                    .collect();
                if paginated {
                    body.insert("offset".into(), ticket.offset.into());
                    body.insert("limit".into(), ticket.limit.into());
                }
                Payload::Body(Value::Object(body))
            }
            (ListTransport::Token, HttpMethod::Get) => {
                let mut query = vec![("q".to_string(), filters::encode(filters))];
                if paginated {
                    query.push(("offset".to_string(), ticket.offset.to_string()));
                    query.push(("limit".to_string(), ticket.limit.to_string()));
                }
                Payload::Query(query)
            }
            (ListTransport::Token, HttpMethod::Post) => {
                let mut body = Map::new();
                body.insert("q".into(), filters::encode(filters).into());
                if paginated {
                    body.insert("offset".into(), ticket.offset.into());
                    body.insert("limit".into(), ticket.limit.into());
                }
                Payload::Body(Value::Object(body))
            }
        }
    }

    async fn send_list(&self, payload: Payload) -> ApiResult<Value> {
        let options = if self.descriptor.extended_timeout {
            RequestOptions::with_timeout(self.extended_timeout)
        } else {
            RequestOptions::default()
        };
        let path = self.descriptor.list_path;
        match payload {
            Payload::Query(query) => self.api.get_json(path, &query, options).await,
            Payload::Body(body) => self.api.post_json(path, &body, options).await,
        }
    }

    fn parse_page(&self, body: Value, ticket: LoadTicket) -> StoreResult<Page<T>> {
        let malformed = |what: &str| {
            StoreError::Decode(format!(
                "{} list response {}",
                self.descriptor.name, what
            ))
        };

        let (raw_items, results, counts) = match (self.descriptor.items_key, body) {
            (_, Value::Null) => (Vec::new(), None, ResourceCounts::default()),
            (None, Value::Array(items)) => (items, None, ResourceCounts::default()),
            (Some(key), Value::Object(mut object)) => {
                let items = match object.remove(key) {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => Vec::new(),
                    Some(_) => return Err(malformed(&format!("has a non-array `{key}`"))),
                };
                let results = object.get("results").and_then(Value::as_u64);
                let mut counts = ResourceCounts::default();
                for (name, value) in &object {
                    if name.starts_with("count_")
                        && let Some(n) = value.as_u64()
                    {
                        counts.insert(name.clone(), n);
                    }
                }
                (items, results, counts)
            }
            (None, _) => return Err(malformed("is not an array")),
            (Some(_), _) => return Err(malformed("is not an object")),
        };

        let items: Vec<T> = serde_json::from_value(Value::Array(raw_items))
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let total = results.unwrap_or(items.len() as u64);
        Ok(Page::new(items, ticket.offset, total, ticket.limit).with_counts(counts))
    }

    // ---- Toggles ----

    pub async fn toggle(
        &self,
        key: &T::Key,
        list: MembershipList,
    ) -> StoreResult<ToggleOutcome> {
        self.toggle_with(key, list, None).await
    }

    /// Flip a membership flag locally, then tell the server.
    ///
    /// If the server call fails or is cancelled the local flip is reverted
    /// (unless the flag changed again in the meantime) and the error is
    /// returned. Unknown keys and lists outside this resource's set are
    /// silent no-ops.
    pub async fn toggle_with(
        &self,
        key: &T::Key,
        list: MembershipList,
        cancel: Option<&CancellationToken>,
    ) -> StoreResult<ToggleOutcome> {
        let Some(endpoint) = self.descriptor.toggle.as_ref() else {
            debug!("[{}] No toggle endpoint, ignoring {}", self.tag(), list);
            return Ok(ToggleOutcome::NoOp);
        };

        let mut body = Map::new();
        body.insert(
            endpoint.id_field.to_string(),
            serde_json::to_value(key).map_err(|e| StoreError::Decode(e.to_string()))?,
        );
        body.insert("list".into(), list.api_name().into());
        let body = Value::Object(body);

        let applied = {
            let mut state = self.state.write();
            toggle::toggle(state.page.items_mut(), key, list, &endpoint.lists)
        };
        let Some(applied) = applied else {
            debug!("[{}] Toggle {} on {} is a no-op", self.tag(), list, key);
            return Ok(ToggleOutcome::NoOp);
        };

        let result = Self::cancellable(
            cancel,
            self.api
                .post_json(endpoint.path, &body, RequestOptions::default()),
        )
        .await;

        match result {
            Ok(_) => Ok(ToggleOutcome::Applied {
                value: applied.value,
            }),
            Err(err) => {
                let reverted = {
                    let mut state = self.state.write();
                    toggle::revert(state.page.items_mut(), &applied)
                };
                warn!(
                    "[{}] Toggle {} on {} failed (reverted: {}): {}",
                    self.tag(),
                    list,
                    key,
                    reverted,
                    err
                );
                Err(err)
            }
        }
    }

    // ---- Single items ----

    pub async fn get_by_id(&self, id: impl fmt::Display) -> StoreResult<T> {
        self.get_by_id_with(id, None).await
    }

    pub async fn get_by_id_with(
        &self,
        id: impl fmt::Display,
        cancel: Option<&CancellationToken>,
    ) -> StoreResult<T> {
        let Some(prefix) = self.descriptor.item_path else {
            return Err(StoreError::Unsupported {
                resource: self.descriptor.name,
                operation: "single item lookup",
            });
        };
        let path = format!("{}/{}", prefix, id);
        let body = Self::cancellable(
            cancel,
            self.api.get_json(&path, &[], RequestOptions::default()),
        )
        .await?;
        serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn cancellable<F>(
        cancel: Option<&CancellationToken>,
        request: F,
    ) -> StoreResult<Value>
    where
        F: Future<Output = ApiResult<Value>>,
    {
        match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(StoreError::Cancelled),
                result = request => result.map_err(StoreError::from),
            },
            None => request.await.map_err(StoreError::from),
        }
    }
}
